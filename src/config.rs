//! Configuration: config.toml takes priority over environment variables,
//! which take priority over built-in defaults.

use serde::Deserialize;
use std::path::Path;

pub const SERVER_ADDR: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 3000;

pub const DEFAULT_DATABASE_PATH: &str = "data/treiglo.db";
pub const DEFAULT_DATA_DIR: &str = "data/cards";

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

/// Persisted history ring cap.
pub const HISTORY_MAX: usize = 500;

/// Smart mode re-queues a missed card after this many other picks.
pub const SMART_REQUEUE_DELAY: u32 = 2;

/// Shuffle mode reinserts a missed card this many positions ahead.
pub const DECK_REINSERT_OFFSET: usize = 3;

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  database: DatabaseSection,
  #[serde(default)]
  content: ContentSection,
}

#[derive(Debug, Deserialize, Default)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ContentSection {
  dir: Option<String>,
}

fn read_config_file() -> Option<ConfigFile> {
  let path = Path::new("config.toml");
  if !path.exists() {
    return None;
  }
  match std::fs::read_to_string(path) {
    Ok(raw) => match toml::from_str(&raw) {
      Ok(cfg) => Some(cfg),
      Err(e) => {
        tracing::warn!("failed to parse config.toml: {}", e);
        None
      }
    },
    Err(e) => {
      tracing::warn!("failed to read config.toml: {}", e);
      None
    }
  }
}

/// Resolve the SQLite path: config.toml > DATABASE_PATH env > default.
pub fn load_database_path() -> String {
  dotenvy::dotenv().ok();

  if let Some(cfg) = read_config_file() {
    if let Some(path) = cfg.database.path {
      tracing::info!("using database path from config.toml: {}", path);
      return path;
    }
  }

  if let Ok(path) = std::env::var("DATABASE_PATH") {
    tracing::info!("using database path from environment: {}", path);
    return path;
  }

  tracing::info!("using default database path: {}", DEFAULT_DATABASE_PATH);
  DEFAULT_DATABASE_PATH.to_string()
}

/// Resolve the card data directory: config.toml > DATA_DIR env > default.
pub fn load_data_dir() -> String {
  dotenvy::dotenv().ok();

  if let Some(cfg) = read_config_file() {
    if let Some(dir) = cfg.content.dir {
      tracing::info!("using data dir from config.toml: {}", dir);
      return dir;
    }
  }

  if let Ok(dir) = std::env::var("DATA_DIR") {
    tracing::info!("using data dir from environment: {}", dir);
    return dir;
  }

  DEFAULT_DATA_DIR.to_string()
}

pub fn server_bind_addr() -> String {
  format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}
