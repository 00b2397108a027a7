//! Persistence. All trainer state lives in a small key-value table; values
//! are JSON blobs. Writes are best effort: a failed save is logged at warn
//! and the session continues in memory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Well-known store keys.
pub mod keys {
  pub const FILTERS: &str = "filters";
  pub const PRACTICE_MODE: &str = "practice_mode";
  pub const LEITNER_BOXES: &str = "leitner_boxes";
  pub const HISTORY: &str = "history";
  pub const SESSION: &str = "session";
  pub const STREAK_RESET_AT: &str = "streak_reset_at";
}

/// Log an error at warn and carry on with a fallback.
pub trait LogOnError<T> {
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

/// Minimal persistence port the trainer talks to.
pub trait KeyValueStore: Send {
  fn get(&self, key: &str) -> Option<String>;
  /// Best effort; implementations log failures instead of returning them.
  fn set(&mut self, key: &str, value: &str);
  /// Drop everything (device reset).
  fn clear(&mut self);
}

pub fn get_json<T: DeserializeOwned>(
  store: &dyn KeyValueStore,
  key: &str,
) -> Option<T> {
  let raw = store.get(key)?;
  serde_json::from_str(&raw)
    .log_warn(&format!("discarding unreadable state for '{}'", key))
}

pub fn set_json<T: Serialize>(
  store: &mut dyn KeyValueStore,
  key: &str,
  value: &T,
) {
  match serde_json::to_string(value) {
    Ok(raw) => store.set(key, &raw),
    Err(e) => tracing::warn!("failed to serialize '{}': {}", key, e),
  }
}

/// SQLite-backed store. A single connection behind a mutex is plenty for
/// one trainer.
pub struct SqliteStore {
  conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
  pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
    if let Some(parent) = Path::new(path).parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).log_warn("creating database dir");
      }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch(
      "CREATE TABLE IF NOT EXISTS kv (
         key TEXT PRIMARY KEY,
         value TEXT NOT NULL
       );",
    )?;
    tracing::info!("opened state store at {}", path);
    Ok(Self {
      conn: Arc::new(Mutex::new(conn)),
    })
  }
}

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Option<String> {
    let conn = match self.conn.lock() {
      Ok(c) => c,
      Err(e) => {
        tracing::warn!("store lock poisoned on get: {}", e);
        return None;
      }
    };
    conn
      .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
        row.get(0)
      })
      .ok()
  }

  fn set(&mut self, key: &str, value: &str) {
    let conn = match self.conn.lock() {
      Ok(c) => c,
      Err(e) => {
        tracing::warn!("store lock poisoned on set: {}", e);
        return;
      }
    };
    conn
      .execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
      )
      .log_warn("persisting state");
  }

  fn clear(&mut self) {
    let conn = match self.conn.lock() {
      Ok(c) => c,
      Err(e) => {
        tracing::warn!("store lock poisoned on clear: {}", e);
        return;
      }
    };
    conn.execute("DELETE FROM kv", []).log_warn("clearing state");
  }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  map: HashMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.map.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: &str) {
    self.map.insert(key.to_string(), value.to_string());
  }

  fn clear(&mut self) {
    self.map.clear();
  }
}
