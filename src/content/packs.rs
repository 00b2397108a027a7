//! Built-in themed packs. Selecting a pack constrains the card pool by
//! source file and trigger list, and can force a rule family or category.

use crate::domain::RuleFamily;

#[derive(Debug, Clone, Copy)]
pub struct PackDef {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  /// Source files the pack draws from; empty means all sources.
  pub source_scope: &'static [&'static str],
  /// Canonical trigger tokens; empty means all triggers.
  pub triggers: &'static [&'static str],
  pub force_family: Option<RuleFamily>,
  pub force_category: Option<&'static str>,
  /// Keep only short, simple sentences.
  pub limit_complexity: bool,
}

pub const PACKS: &[PackDef] = &[
  PackDef {
    id: "starter-preps",
    title: "Starter prepositions",
    description: "The common simple prepositions that cause soft mutation.",
    source_scope: &["prep.csv"],
    triggers: &[
      "am", "ar", "at", "dan", "dros", "drwy", "gan", "heb", "hyd", "i",
      "o", "tan", "wrth",
    ],
    force_family: None,
    force_category: None,
    limit_complexity: false,
  },
  PackDef {
    id: "numbers-1-10",
    title: "Numbers 1\u{2013}10",
    description: "Mutations after the numerals one to ten.",
    source_scope: &["numerals.csv"],
    triggers: &[
      "un", "dau", "dwy", "tri", "tair", "pedwar", "pedair", "pump", "pum",
      "chwech", "chwe", "saith", "wyth", "naw", "deg",
    ],
    force_family: None,
    force_category: Some("Numerals"),
    limit_complexity: false,
  },
  PackDef {
    id: "articles",
    title: "The definite article",
    description: "Soft mutation of feminine singular nouns after y/yr/'r.",
    source_scope: &["articles.csv"],
    triggers: &["y", "yr", "'r"],
    force_family: None,
    force_category: Some("Article"),
    limit_complexity: true,
  },
  PackDef {
    id: "place-names",
    title: "Place names",
    description: "Nasal mutation of place names after the locative yn.",
    source_scope: &["placenames.csv"],
    triggers: &[],
    force_family: Some(RuleFamily::Nasal),
    force_category: Some("PlaceName"),
    limit_complexity: false,
  },
];

pub fn find(id: &str) -> Option<&'static PackDef> {
  PACKS.iter().find(|p| p.id == id)
}

pub fn all() -> &'static [PackDef] {
  PACKS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pack_ids_are_unique() {
    for (i, a) in PACKS.iter().enumerate() {
      for b in &PACKS[i + 1..] {
        assert_ne!(a.id, b.id);
      }
    }
  }

  #[test]
  fn test_find_known_and_unknown() {
    assert!(find("starter-preps").is_some());
    assert!(find("place-names").is_some());
    assert!(find("nope").is_none());
  }
}
