use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, DisplayItem, InputMode};
use crate::manager::Clock;
use crate::status::{format_due_text, Status};
use crate::storage::Store;

fn status_color(status: Status) -> Color {
    match status {
        Status::Overdue => Color::Red,
        Status::DueSoon => Color::Yellow,
        Status::Upcoming => Color::Cyan,
        Status::Future => Color::Green,
    }
}

pub fn ui<S: Store, C: Clock>(f: &mut Frame, app: &mut App<S, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),    // Table
                Constraint::Length(3), // Message
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(f.area());

    let today = app.manager.today();
    let rows: Vec<Row> = app
        .display_items
        .iter()
        .map(|item| match item {
            DisplayItem::StatusHeader(status, count) => Row::new(vec![
                Cell::from(format!("{} ({})", status.label(), count)),
                Cell::from(""),
                Cell::from(""),
                Cell::from(""),
                Cell::from(""),
            ])
            .style(
                Style::default()
                    .fg(status_color(*status))
                    .add_modifier(Modifier::BOLD),
            ),
            DisplayItem::Task(t) => {
                let category = t
                    .category_id
                    .as_deref()
                    .and_then(|id| app.manager.category(id).ok());
                let category_cell = match category {
                    Some(c) => {
                        let cell = Cell::from(c.name.clone());
                        match c.rgb() {
                            Some((r, g, b)) => cell.style(Style::default().fg(Color::Rgb(r, g, b))),
                            None => cell,
                        }
                    }
                    None => Cell::from(""),
                };
                Row::new(vec![
                    Cell::from(format!("  {}", t.name)),
                    category_cell,
                    Cell::from(t.schedule.label(&t.frequency)),
                    Cell::from(t.next_due.to_string()),
                    Cell::from(format_due_text(t.next_due, today)),
                ])
            }
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Length(24),
        Constraint::Length(12),
        Constraint::Length(18),
    ];

    let title = match app.category_filter_name() {
        Some(name) => format!("Choreust - Dashboard [{}]", name),
        None => "Choreust - Dashboard".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Task", "Category", "Schedule", "Next Due", "When"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    let (message, message_style) = match &app.message {
        Some(m) if m.is_error => (m.text.as_str(), Style::default().fg(Color::Red)),
        Some(m) => (m.text.as_str(), Style::default().fg(Color::Green)),
        None => ("", Style::default()),
    };
    let message = Paragraph::new(message)
        .style(message_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => {
            "q: Quit | j/k: Move | Space: Done today | u: Undo last | d: Del | a: Add | f: Filter category"
        }
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.add_state.step {
            0 => "Add Task: Enter Name",
            1 => "Add Task: Frequency (daily, weekly, monthly, custom:45 ...) [monthly]",
            2 => "Add Task: First Due (YYYY-MM-DD) or anchor (quarter-end, day-of-month:15 ...) [today]",
            _ => "Add Task",
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(margin),
                Constraint::Length(height),
                Constraint::Length(margin),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
