//! Answer checking. Comparison is on normalized forms, so case, diacritics
//! and apostrophe style never cost a point.

use crate::content::normalize;

pub fn check_answer(guess: &str, expected: &str) -> bool {
  let g = normalize(guess);
  if g.is_empty() {
    return false;
  }
  g == normalize(expected)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exact_match() {
    assert!(check_answer("Gaerdydd", "Gaerdydd"));
  }

  #[test]
  fn test_case_insensitive() {
    assert!(check_answer("gaerdydd", "Gaerdydd"));
  }

  #[test]
  fn test_diacritics_ignored() {
    assert!(check_answer("tan", "tân"));
  }

  #[test]
  fn test_surrounding_whitespace_ignored() {
    assert!(check_answer("  Fangor ", "Fangor"));
  }

  #[test]
  fn test_wrong_answer() {
    assert!(!check_answer("Caerdydd", "Gaerdydd"));
  }

  #[test]
  fn test_empty_guess_is_wrong() {
    assert!(!check_answer("", "Gaerdydd"));
    assert!(!check_answer("   ", "Gaerdydd"));
  }
}
