//! Leitner box scheduling.
//!
//! Every card lives in one of five boxes. A correct answer promotes the card
//! one box, anything else sends it back to box 1. Smart mode draws the next
//! card with weights that heavily favour the low boxes, and a short
//! reinforcement queue forces recently missed cards back after a couple of
//! other picks.

use std::collections::HashMap;

use rand::Rng;

use crate::domain::{Card, ReviewResult};

pub const MAX_BOX: u8 = 5;

/// Draw weights indexed by box number (index 0 unused).
const WEIGHTS: [u32; 6] = [0, 50, 25, 15, 7, 3];

/// Clamp a persisted box number into the valid range. Anything below 1
/// (including garbage negative values from old state) becomes 1.
pub fn clamp_box(n: i64) -> u8 {
  n.clamp(1, MAX_BOX as i64) as u8
}

/// Box assignment per card id. Cards never seen default to box 1.
#[derive(Debug, Default, Clone)]
pub struct LeitnerBoxes {
  boxes: HashMap<String, u8>,
}

impl LeitnerBoxes {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_map(raw: HashMap<String, i64>) -> Self {
    let boxes = raw
      .into_iter()
      .map(|(id, n)| (id, clamp_box(n)))
      .collect();
    Self { boxes }
  }

  pub fn to_map(&self) -> &HashMap<String, u8> {
    &self.boxes
  }

  pub fn box_for(&self, card_id: &str) -> u8 {
    self
      .boxes
      .get(card_id)
      .copied()
      .map(|n| clamp_box(n as i64))
      .unwrap_or(1)
  }

  pub fn set(&mut self, card_id: &str, n: u8) {
    self.boxes.insert(card_id.to_string(), clamp_box(n as i64));
  }

  /// Promote on correct, demote to box 1 on anything else.
  pub fn update(&mut self, card_id: &str, result: ReviewResult) -> u8 {
    let next = match result {
      ReviewResult::Correct => (self.box_for(card_id) + 1).min(MAX_BOX),
      _ => 1,
    };
    self.boxes.insert(card_id.to_string(), next);
    next
  }

  /// Per-box counts over the given pool (not over the whole store).
  pub fn counts(&self, pool: &[Card]) -> [usize; 6] {
    let mut out = [0usize; 6];
    for card in pool {
      out[self.box_for(&card.id) as usize] += 1;
    }
    out
  }

  /// Cards in boxes 4 and 5 count as mastered.
  pub fn mastered(&self, pool: &[Card]) -> usize {
    pool.iter().filter(|c| self.box_for(&c.id) >= 4).count()
  }
}

/// A missed card waiting in the reinforcement queue. `due_after` counts down
/// on every pick; at zero the card is forced as the next selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
  pub index: usize,
  pub due_after: u32,
}

/// Pick the next pool index for smart mode.
///
/// Queue entries take priority once due. Otherwise a weighted draw across the
/// non-empty boxes, then a uniform pick within the chosen box, resampling a
/// few times to avoid an immediate repeat.
pub fn pick_next(
  pool: &[Card],
  boxes: &LeitnerBoxes,
  queue: &mut Vec<QueueEntry>,
  last: Option<usize>,
  rng: &mut impl Rng,
) -> usize {
  if pool.is_empty() {
    return 0;
  }
  if pool.len() == 1 {
    queue.clear();
    return 0;
  }

  for entry in queue.iter_mut() {
    entry.due_after = entry.due_after.saturating_sub(1);
  }
  if let Some(pos) = queue
    .iter()
    .position(|e| e.due_after == 0 && Some(e.index) != last)
  {
    let entry = queue.remove(pos);
    if entry.index < pool.len() {
      return entry.index;
    }
  }

  let mut buckets: [Vec<usize>; 6] = Default::default();
  for (i, card) in pool.iter().enumerate() {
    buckets[boxes.box_for(&card.id) as usize].push(i);
  }

  let total: u32 = (1..=MAX_BOX as usize)
    .filter(|b| !buckets[*b].is_empty())
    .map(|b| WEIGHTS[b])
    .sum();

  let mut chosen_box = (1..=MAX_BOX as usize)
    .find(|b| !buckets[*b].is_empty())
    .unwrap_or(1);
  if total > 0 {
    let mut r = rng.random_range(0..total);
    for b in 1..=MAX_BOX as usize {
      if buckets[b].is_empty() {
        continue;
      }
      if r < WEIGHTS[b] {
        chosen_box = b;
        break;
      }
      r -= WEIGHTS[b];
    }
  }

  let bucket = &buckets[chosen_box];
  let mut idx = bucket[rng.random_range(0..bucket.len())];
  let mut attempts = 0;
  while Some(idx) == last && bucket.len() > 1 && attempts < 6 {
    idx = bucket[rng.random_range(0..bucket.len())];
    attempts += 1;
  }
  idx
}
