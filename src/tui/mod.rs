//! Interactive dashboard.

pub mod app;
pub mod ui;

use std::{error::Error, io};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::manager::{Clock, TaskManager};
use crate::storage::Store;
use app::{App, InputMode};

type CrosstermTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Runs the dashboard until the user quits. The terminal is restored even
/// when the loop fails.
pub fn run_tui<S: Store, C: Clock>(manager: TaskManager<S, C>) -> Result<(), Box<dyn Error>> {
    let mut terminal = enter_terminal()?;
    let mut app = App::new(manager);
    let res = run_app(&mut terminal, &mut app);
    leave_terminal(&mut terminal)?;
    res.map_err(Into::into)
}

fn enter_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn run_app<B: Backend, S: Store, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let keep_running = match app.input_mode {
            InputMode::Normal => dashboard_key(app, key),
            InputMode::Adding => {
                wizard_key(app, key);
                true
            }
        };
        if !keep_running {
            return Ok(());
        }
    }
}

/// Returns false when the user asked to quit.
fn dashboard_key<S: Store, C: Clock>(app: &mut App<S, C>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return false,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Char(' ') | KeyCode::Char('c') => app.complete_selected(),
        KeyCode::Char('u') => app.undo_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('a') => app.start_add(),
        KeyCode::Char('f') => app.cycle_category(),
        _ => {}
    }
    true
}

fn wizard_key<S: Store, C: Clock>(app: &mut App<S, C>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.handle_input(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}
