use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{AppData, SCHEMA_VERSION};

/// Environment variable overriding the data file location.
pub const DB_ENV_VAR: &str = "CHOREUST_DB";

/// Backing store for the whole application state.
///
/// `persist` must be durable before it returns `Ok`; the state manager only
/// commits a mutation in memory after that.
pub trait Store {
    fn load(&mut self) -> Result<AppData>;
    fn persist(&mut self, data: &AppData) -> Result<()>;
}

/// Returns the path to the data file (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `CHOREUST_DB` environment variable.
/// 2. `~/.local/share/choreust/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var(DB_ENV_VAR).map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("choreust");
        p.push("tasks.json");
        p
    })
}

/// Reads `schemaVersion`, rejecting documents newer than this build.
fn schema_version(doc: &Value) -> Result<u32> {
    let version = doc
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(SCHEMA_VERSION));
    if version > u64::from(SCHEMA_VERSION) {
        return Err(Error::Persistence(format!(
            "data file has schema version {}, this build understands up to {}",
            version, SCHEMA_VERSION
        )));
    }
    Ok(version as u32)
}

/// Brings an older document up to [`SCHEMA_VERSION`].
pub fn migrate(mut doc: Value) -> Result<AppData> {
    let version = schema_version(&doc)?;
    // v1 covers both interval-only and calendar-extended files: a task
    // without scheduleType is an interval task. Later versions go here.
    if version < SCHEMA_VERSION {
        debug!(from = version, to = SCHEMA_VERSION, "migrating data file");
    }
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
    }
    Ok(serde_json::from_value(doc)?)
}

/// Notice that the data file could not be parsed and was moved aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub backup: PathBuf,
    pub reason: String,
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    recovery: Option<Recovery>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore {
            path: path.into(),
            recovery: None,
        }
    }

    /// Store at the configured [`db_path`].
    pub fn open_default() -> Self {
        Self::new(db_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set when the last `load` quarantined an unparseable file. Callers are
    /// expected to show it to the user.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    /// Moves an unparseable data file aside and starts from a fresh state.
    fn recover(&mut self, err: Error) -> Result<AppData> {
        let backup = PathBuf::from(format!(
            "{}.corrupt-{}-{}",
            self.path.display(),
            Utc::now().format("%Y%m%d%H%M%S%9f"),
            std::process::id()
        ));
        if backup.exists() {
            return Err(Error::Persistence(format!(
                "cannot move unreadable data file aside: {} already exists",
                backup.display()
            )));
        }
        fs::rename(&self.path, &backup)?;
        warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            error = %err,
            "data file unreadable, moved aside and starting fresh"
        );
        self.recovery = Some(Recovery {
            backup,
            reason: err.to_string(),
        });
        Ok(AppData::default())
    }
}

impl Store for JsonStore {
    fn load(&mut self) -> Result<AppData> {
        self.recovery = None;
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting fresh");
            return Ok(AppData::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let doc = match serde_json::from_str::<Value>(&raw) {
            Ok(doc) => doc,
            Err(err) => return self.recover(err.into()),
        };
        // Parseable but unusable files stay where they are so no task is lost.
        migrate(doc).map_err(|err| {
            Error::Persistence(format!(
                "{} could not be loaded, fix or move it and retry: {}",
                self.path.display(),
                err
            ))
        })
    }

    fn persist(&mut self, data: &AppData) -> Result<()> {
        let s = serde_json::to_string_pretty(data)?;
        write_atomic(&self.path, s.as_bytes())?;
        debug!(path = %self.path.display(), tasks = data.tasks.len(), "state persisted");
        Ok(())
    }
}

/// Atomically write data to a file
///
/// Writes a temporary file next to the target, syncs it, then renames it
/// over the target, so readers see either the old or the new file.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<AppData>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `data`.
    pub fn with_data(data: AppData) -> Self {
        MemoryStore {
            data: Some(data),
            writes: 0,
        }
    }

    /// Last persisted state.
    pub fn data(&self) -> Option<&AppData> {
        self.data.as_ref()
    }

    /// Number of successful persists.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    fn load(&mut self) -> Result<AppData> {
        Ok(self.data.clone().unwrap_or_default())
    }

    fn persist(&mut self, data: &AppData) -> Result<()> {
        self.data = Some(data.clone());
        self.writes += 1;
        Ok(())
    }
}
