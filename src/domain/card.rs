use serde::{Deserialize, Serialize};

/// The four Welsh mutation rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleFamily {
  Soft,
  Aspirate,
  Nasal,
  None,
}

impl RuleFamily {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "Soft" => Some(Self::Soft),
      "Aspirate" => Some(Self::Aspirate),
      "Nasal" => Some(Self::Nasal),
      "None" => Some(Self::None),
      _ => Option::None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Soft => "Soft",
      Self::Aspirate => "Aspirate",
      Self::Nasal => "Nasal",
      Self::None => "None",
    }
  }

  /// Derive the family from a machine-short outcome code.
  pub fn from_outcome(outcome: Outcome) -> Self {
    match outcome {
      Outcome::Sm => Self::Soft,
      Outcome::Am => Self::Aspirate,
      Outcome::Nm => Self::Nasal,
      Outcome::None => Self::None,
    }
  }
}

/// Machine-short outcome code, used for stats bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
  #[serde(rename = "SM")]
  Sm,
  #[serde(rename = "AM")]
  Am,
  #[serde(rename = "NM")]
  Nm,
  #[serde(rename = "NONE")]
  None,
}

impl Outcome {
  /// Case-insensitive parse; quotes in raw values are stripped by the caller.
  pub fn from_str(s: &str) -> Option<Self> {
    match s.to_uppercase().as_str() {
      "SM" => Some(Self::Sm),
      "AM" => Some(Self::Am),
      "NM" => Some(Self::Nm),
      "NONE" => Some(Self::None),
      _ => Option::None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sm => "SM",
      Self::Am => "AM",
      Self::Nm => "NM",
      Self::None => "NONE",
    }
  }
}

/// One flashcard. Immutable once loaded; scheduling and filtering operate on
/// indices and ids only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  /// Stable identity: the explicit id field if present, else a content hash.
  pub id: String,
  pub rule_family: RuleFamily,
  pub rule_category: String,
  /// Surface trigger token as it appears in the data.
  pub trigger: String,
  /// Normalized trigger used for matching (diacritics, case, glosses stripped).
  pub trigger_canon: String,
  /// Unmutated form.
  pub base: String,
  /// Expected mutated form.
  pub answer: String,
  pub before: String,
  pub after: String,
  pub outcome: Outcome,
  pub word_category: String,
  pub why: String,
  pub translate: String,
  /// Originating data file, used for pack scoping.
  pub source: String,
}

impl Card {
  /// Reconstruct the full sentence with the answer in place.
  pub fn full_sentence(&self) -> String {
    let parts = [
      self.before.trim_end(),
      self.answer.trim(),
      self.after.trim_start(),
    ];
    let joined = parts
      .iter()
      .filter(|p| !p.is_empty())
      .cloned()
      .collect::<Vec<_>>()
      .join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    // Re-attach punctuation that ended up after a space
    let mut out = String::with_capacity(collapsed.len());
    for ch in collapsed.chars() {
      if matches!(ch, ',' | '.' | ';' | ':' | '!' | '?') && out.ends_with(' ') {
        out.pop();
      }
      out.push(ch);
    }
    out
  }

  /// First letter of the expected answer, shown as a hint.
  pub fn hint(&self) -> Option<char> {
    self.answer.chars().next()
  }
}
