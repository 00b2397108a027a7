use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::srs::PracticeMode;

use super::Outcome;

/// What the reviewer did with the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
  Correct,
  Wrong,
  Skipped,
  /// Answer shown without an attempt. Resets the streak but is not scored.
  Revealed,
}

impl ReviewResult {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Correct => "correct",
      Self::Wrong => "wrong",
      Self::Skipped => "skipped",
      Self::Revealed => "revealed",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "correct" => Some(Self::Correct),
      "wrong" => Some(Self::Wrong),
      "skipped" => Some(Self::Skipped),
      "revealed" => Some(Self::Revealed),
      _ => None,
    }
  }

  /// Scored events count toward done/accuracy; a bare reveal does not.
  pub fn is_scored(&self) -> bool {
    !matches!(self, Self::Revealed)
  }
}

/// One review outcome, as produced by the practice surface and consumed by
/// the session tracker and the Leitner store.
#[derive(Debug, Clone)]
pub struct ReviewEvent {
  pub result: ReviewResult,
  pub outcome: Outcome,
  pub category: String,
  pub card_id: String,
  /// True when the answer was revealed before this card was checked.
  pub used_reveal: bool,
}

/// Persisted history record, most-recent-first, capped at
/// [`config::HISTORY_MAX`] entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub t: DateTime<Utc>,
  pub ok: bool,
  /// `category:trigger:base`, kept for miss export.
  pub key: String,
  pub card_id: String,
  pub expected: String,
  pub got: String,
  pub outcome: Outcome,
  pub mode: PracticeMode,
  #[serde(default)]
  pub skipped: bool,
}

/// Prepend an entry and drop anything beyond the cap.
pub fn push_history(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
  history.insert(0, entry);
  history.truncate(config::HISTORY_MAX);
}
