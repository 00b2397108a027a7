//! Text normalization for matching triggers and checking answers.
//!
//! Welsh data arrives with circumflexes (â, ŵ, ŷ), curly apostrophes, and
//! bracketed English glosses ("y (the)"). Matching works on a canonical form
//! with all of that stripped.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip diacritics, fold apostrophes, collapse whitespace.
pub fn normalize(s: &str) -> String {
  let stripped: String = s
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .map(|c| if c == '\u{2019}' { '\'' } else { c })
    .collect();
  stripped
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Canonicalize a trigger value for reliable matching: drop bracketed
/// glosses, normalize, and keep only the first token if several remain.
pub fn canonical_trigger(s: &str) -> String {
  let mut x = String::with_capacity(s.len());
  let mut depth_paren = 0usize;
  let mut depth_bracket = 0usize;
  for c in s.chars() {
    match c {
      '(' => depth_paren += 1,
      ')' => depth_paren = depth_paren.saturating_sub(1),
      '[' => depth_bracket += 1,
      ']' => depth_bracket = depth_bracket.saturating_sub(1),
      _ if depth_paren == 0 && depth_bracket == 0 => x.push(c),
      _ => {}
    }
  }
  let norm = normalize(&x);
  match norm.split_whitespace().next() {
    Some(first) => first.to_string(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_strips_diacritics() {
    assert_eq!(normalize("tân"), "tan");
    assert_eq!(normalize("Tŷ"), "ty");
    assert_eq!(normalize("ŵy"), "wy");
  }

  #[test]
  fn test_normalize_folds_apostrophes() {
    assert_eq!(normalize("dw i\u{2019}n"), "dw i'n");
  }

  #[test]
  fn test_normalize_collapses_whitespace() {
    assert_eq!(normalize("  y   ferch  "), "y ferch");
  }

  #[test]
  fn test_canonical_trigger_strips_parenthetical_gloss() {
    assert_eq!(canonical_trigger("i (to)"), "i");
    assert_eq!(canonical_trigger("I"), "i");
  }

  #[test]
  fn test_canonical_trigger_strips_bracketed_gloss() {
    assert_eq!(canonical_trigger("y [the]"), "y");
  }

  #[test]
  fn test_canonical_trigger_keeps_first_token() {
    assert_eq!(canonical_trigger("o (from) / oddi"), "o");
    assert_eq!(canonical_trigger("dan neu o dan"), "dan");
  }

  #[test]
  fn test_canonical_trigger_empty_input() {
    assert_eq!(canonical_trigger(""), "");
    assert_eq!(canonical_trigger("(gloss only)"), "");
  }

  #[test]
  fn test_canonical_trigger_diacritics() {
    assert_eq!(canonical_trigger("â (with)"), "a");
  }
}
