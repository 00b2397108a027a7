//! Data directory scan: every *.csv file becomes a batch of raw rows tagged
//! with its file name. Unreadable files are logged and skipped, never fatal.

use std::collections::HashMap;
use std::path::Path;

use crate::content::cards::RawRow;

/// Read all CSV files under `dir`, sorted by file name for a stable order.
pub fn scan_dir(dir: &Path) -> Vec<RawRow> {
  let mut files: Vec<std::path::PathBuf> = match std::fs::read_dir(dir) {
    Ok(entries) => entries
      .filter_map(|e| e.ok())
      .map(|e| e.path())
      .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
      .collect(),
    Err(e) => {
      tracing::warn!("cannot read data dir {}: {}", dir.display(), e);
      return Vec::new();
    }
  };
  files.sort();

  let mut rows = Vec::new();
  for path in files {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    match read_file(&path, &name) {
      Ok(mut file_rows) => {
        tracing::info!("read {} rows from {}", file_rows.len(), name);
        rows.append(&mut file_rows);
      }
      Err(e) => {
        tracing::warn!("skipping {}: {}", name, e);
      }
    }
  }
  rows
}

fn read_file(path: &Path, source: &str) -> Result<Vec<RawRow>, csv::Error> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::All)
    .from_path(path)?;
  let headers = reader.headers()?.clone();

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = match record {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!("bad record in {}: {}", source, e);
        continue;
      }
    };
    let mut fields = HashMap::new();
    for (i, value) in record.iter().enumerate() {
      if let Some(header) = headers.get(i) {
        fields.insert(header.to_string(), value.to_string());
      }
    }
    rows.push(RawRow {
      source: source.to_string(),
      fields,
    });
  }
  Ok(rows)
}
