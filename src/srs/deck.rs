//! Shuffle-mode deck: a shuffled permutation of pool indices with a cursor.
//! Missed cards are pulled out and reinserted a few positions ahead so they
//! come back soon without being the very next card.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config;

#[derive(Debug, Clone, Default)]
pub struct Deck {
  order: Vec<usize>,
  cursor: usize,
}

impl Deck {
  /// Build a fresh shuffled deck over pool indices `0..n`.
  pub fn build(n: usize, rng: &mut impl Rng) -> Self {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    Self { order, cursor: 0 }
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Pool index under the cursor, if the deck is non-empty.
  pub fn current(&self) -> Option<usize> {
    self.order.get(self.cursor).copied()
  }

  /// Zero-based cursor position within the deck.
  pub fn cursor_pos(&self) -> usize {
    self.cursor
  }

  /// Move the cursor, wrapping in either direction.
  pub fn advance(&mut self, offset: i64) {
    if self.order.is_empty() {
      return;
    }
    let n = self.order.len() as i64;
    let pos = (self.cursor as i64 + offset).rem_euclid(n);
    self.cursor = pos as usize;
  }

  /// Pull a missed card out of the deck and put it back a few positions
  /// ahead of where it was, so it reappears shortly but not immediately.
  pub fn reinsert_after_miss(&mut self, pool_index: usize) {
    let Some(pos) = self.order.iter().position(|&i| i == pool_index) else {
      return;
    };
    let current = self.current();
    self.order.remove(pos);
    let target = (pos + config::DECK_REINSERT_OFFSET).min(self.order.len());
    self.order.insert(target, pool_index);
    // Keep the cursor on the card it was showing, unless that was the
    // missed card itself (the caller advances past it next).
    if let Some(cur) = current {
      if cur != pool_index {
        if let Some(p) = self.order.iter().position(|&i| i == cur) {
          self.cursor = p;
        }
      }
    }
  }
}
