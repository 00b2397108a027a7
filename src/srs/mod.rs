pub mod deck;
pub mod leitner;

pub use deck::Deck;
pub use leitner::{LeitnerBoxes, QueueEntry, MAX_BOX};

use serde::{Deserialize, Serialize};

/// How the next card is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
  /// Walk a shuffled deck in order.
  Shuffle,
  /// Weighted draw across Leitner boxes, low boxes favoured.
  Smart,
}

impl PracticeMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Shuffle => "shuffle",
      Self::Smart => "smart",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "shuffle" => Some(Self::Shuffle),
      "smart" => Some(Self::Smart),
      _ => None,
    }
  }
}
