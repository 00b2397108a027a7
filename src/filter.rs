//! Two-layer filter pipeline over the card pool.
//!
//! The pack layer (if a pack is selected) applies first: source scope,
//! forced family/category, trigger whitelist, complexity clamp. The user
//! layer then narrows further: families, categories, a free-text trigger
//! query, and a nil-only toggle. Filtering preserves pool order and is a
//! pure function of its inputs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::content::normalize::canonical_trigger;
use crate::content::packs::PackDef;
use crate::domain::{Card, Outcome, RuleFamily};

pub const ALL_FAMILIES: [RuleFamily; 4] = [
  RuleFamily::Soft,
  RuleFamily::Aspirate,
  RuleFamily::Nasal,
  RuleFamily::None,
];

/// A selected pack, denormalized into owned data so it survives
/// serialization into the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackScope {
  pub pack_id: String,
  pub sources: Vec<String>,
  pub triggers: Vec<String>,
  pub force_family: Option<RuleFamily>,
  pub force_category: Option<String>,
  pub limit_complexity: bool,
}

impl PackScope {
  pub fn from_def(def: &PackDef) -> Self {
    Self {
      pack_id: def.id.to_string(),
      sources: def.source_scope.iter().map(|s| s.to_string()).collect(),
      triggers: def
        .triggers
        .iter()
        .map(|t| canonical_trigger(t))
        .collect(),
      force_family: def.force_family,
      force_category: def.force_category.map(|c| c.to_string()),
      limit_complexity: def.limit_complexity,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterState {
  pub families: Vec<RuleFamily>,
  pub categories: Vec<String>,
  pub trigger_query: String,
  pub nil_only: bool,
  pub pack: Option<PackScope>,
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      families: ALL_FAMILIES.to_vec(),
      categories: Vec::new(),
      trigger_query: String::new(),
      nil_only: false,
      pack: None,
    }
  }
}

impl FilterState {
  /// Reset the user layer, leaving any pack selection in place.
  pub fn reset_user_filters(&mut self) {
    self.families = ALL_FAMILIES.to_vec();
    self.categories.clear();
    self.trigger_query.clear();
    self.nil_only = false;
  }

  /// Selecting a pack replaces the user layer with the pack's scope.
  pub fn apply_pack(&mut self, def: &PackDef) {
    self.reset_user_filters();
    self.pack = Some(PackScope::from_def(def));
  }

  /// Clearing a pack keeps whatever user filters were set meanwhile.
  pub fn clear_pack(&mut self) {
    self.pack = None;
  }

  pub fn has_custom_filters(&self) -> bool {
    self.families.len() != ALL_FAMILIES.len()
      || !self.categories.is_empty()
      || !self.trigger_query.trim().is_empty()
      || self.nil_only
      || self.pack.is_some()
  }
}

/// Markers that introduce a subordinate clause; long sentences containing
/// one are treated as complex.
const CLAUSE_MARKERS: &[&str] = &[
  "pan", "os", "achos", "oherwydd", "tra", "cyn", "wedi", "nes", "fel",
  "pe", "mai", "taw",
];

/// Heuristic complexity test used by packs that want short prompts.
pub fn is_likely_complex(card: &Card) -> bool {
  let sentence = card.full_sentence();
  if sentence.contains(';') || sentence.contains(':') {
    return true;
  }
  let tokens: Vec<&str> = sentence.split_whitespace().collect();
  if tokens.len() > 14 {
    return true;
  }
  if sentence.contains(',') && tokens.len() > 12 {
    return true;
  }
  if tokens.len() > 10 {
    let lower = sentence.to_lowercase();
    if lower
      .split_whitespace()
      .any(|t| CLAUSE_MARKERS.contains(&t.trim_matches(|c: char| !c.is_alphabetic())))
    {
      return true;
    }
  }
  false
}

/// Run the full pipeline. Order of `all` is preserved.
pub fn apply(all: &[Card], f: &FilterState) -> Vec<Card> {
  let mut pool: Vec<&Card> = all.iter().collect();

  if let Some(pack) = &f.pack {
    if !pack.sources.is_empty() {
      pool.retain(|c| pack.sources.iter().any(|s| *s == c.source));
    }
    if let Some(family) = pack.force_family {
      pool.retain(|c| c.rule_family == family);
    }
    if let Some(category) = &pack.force_category {
      pool.retain(|c| &c.rule_category == category);
    }
    if !pack.triggers.is_empty() {
      let set: HashSet<&str> =
        pack.triggers.iter().map(|t| t.as_str()).collect();
      pool.retain(|c| set.contains(c.trigger_canon.as_str()));
    }
  }

  if !f.families.is_empty() && f.families.len() < ALL_FAMILIES.len() {
    pool.retain(|c| f.families.contains(&c.rule_family));
  }

  if !f.categories.is_empty() {
    pool.retain(|c| f.categories.contains(&c.rule_category));
  }

  let query = f.trigger_query.trim();
  if !query.is_empty() {
    let wanted: HashSet<String> = query
      .split(',')
      .map(canonical_trigger)
      .filter(|t| !t.is_empty())
      .collect();
    if !wanted.is_empty() {
      pool.retain(|c| wanted.contains(&c.trigger_canon));
    }
  }

  if f.nil_only {
    pool.retain(|c| {
      c.outcome == Outcome::None || c.rule_family == RuleFamily::None
    });
  }

  if f.pack.as_ref().is_some_and(|p| p.limit_complexity) {
    pool.retain(|c| !is_likely_complex(c));
  }

  pool.into_iter().cloned().collect()
}
