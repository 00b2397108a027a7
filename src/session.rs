//! Per-session scoring: done/correct counts, points, streaks, and
//! per-outcome / per-category breakdowns. A session lives until the user
//! starts a new one; it persists across restarts via the key-value store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::{Card, ReviewEvent, ReviewResult};
use crate::srs::LeitnerBoxes;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tally {
  pub done: u32,
  pub correct: u32,
}

impl Tally {
  fn record(&mut self, ok: bool) {
    self.done += 1;
    if ok {
      self.correct += 1;
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
  pub started_at: DateTime<Utc>,
  pub done: u32,
  pub correct: u32,
  pub points: u32,
  pub streak: u32,
  pub best_streak: u32,
  pub by_outcome: HashMap<String, Tally>,
  pub by_category: HashMap<String, Tally>,
}

impl Default for SessionStats {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionStats {
  pub fn new() -> Self {
    Self {
      started_at: Utc::now(),
      done: 0,
      correct: 0,
      points: 0,
      streak: 0,
      best_streak: 0,
      by_outcome: HashMap::new(),
      by_category: HashMap::new(),
    }
  }

  /// Fold one review event into the session.
  pub fn record(&mut self, ev: &ReviewEvent) {
    if !ev.result.is_scored() {
      // A bare reveal breaks the streak but scores nothing.
      self.streak = 0;
      return;
    }

    let ok = ev.result == ReviewResult::Correct;
    self.done += 1;
    if ok {
      self.correct += 1;
      self.points += config::POINTS_PER_CORRECT;
      // A correct answer after peeking does not extend the streak.
      self.streak = if ev.used_reveal { 0 } else { self.streak + 1 };
      self.best_streak = self.best_streak.max(self.streak);
    } else {
      self.streak = 0;
    }

    self
      .by_outcome
      .entry(ev.outcome.as_str().to_string())
      .or_default()
      .record(ok);
    let category = if ev.category.is_empty() {
      "Uncategorised".to_string()
    } else {
      ev.category.clone()
    };
    self.by_category.entry(category).or_default().record(ok);
  }

  /// Accuracy as a rounded whole-number percentage.
  pub fn accuracy(&self) -> u32 {
    if self.done == 0 {
      return 0;
    }
    ((self.correct as f64 / self.done as f64) * 100.0).round() as u32
  }

  pub fn reset_streak(&mut self) {
    self.streak = 0;
  }
}

/// Mastery over the current pool: cards sitting in the top two boxes.
pub fn mastery(pool: &[Card], boxes: &LeitnerBoxes) -> (usize, usize) {
  (boxes.mastered(pool), pool.len())
}
