//! The trainer: one mutable state machine tying together the card pool,
//! filters, practice mode, Leitner boxes, the active session, and the
//! persisted history. Handlers lock it, call one method, and serialize the
//! result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::content::packs;
use crate::db::{self, get_json, set_json, KeyValueStore};
use crate::domain::{
  push_history, Card, HistoryEntry, Outcome, ReviewEvent, ReviewResult,
  RuleFamily,
};
use crate::filter::{self, FilterState};
use crate::session::{SessionStats, Tally};
use crate::srs::{self, Deck, LeitnerBoxes, PracticeMode, QueueEntry};
use crate::validation;

/// Feedback returned after checking, skipping, or revealing a card.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
  pub result: ReviewResult,
  pub expected: String,
  pub full_sentence: String,
  pub outcome: Outcome,
  pub why: String,
  pub translate: String,
}

/// Lifetime totals derived from the persisted history ring.
#[derive(Debug, Clone, Serialize)]
pub struct LifetimeStats {
  pub attempts: usize,
  pub correct: usize,
  pub skipped: usize,
  pub accuracy: u32,
  pub by_outcome: HashMap<String, Tally>,
}

pub struct Trainer {
  cards: Vec<Card>,
  pool: Vec<Card>,
  filters: FilterState,
  mode: PracticeMode,
  boxes: LeitnerBoxes,
  deck: Deck,
  smart_queue: Vec<QueueEntry>,
  smart_idx: Option<usize>,
  revealed: bool,
  last_result: Option<ReviewResult>,
  session: SessionStats,
  history: Vec<HistoryEntry>,
  streak_reset_at: Option<DateTime<Utc>>,
  store: Box<dyn KeyValueStore>,
}

impl Trainer {
  /// Build a trainer over the loaded cards, restoring persisted state.
  pub fn new(cards: Vec<Card>, store: Box<dyn KeyValueStore>) -> Self {
    let filters: FilterState =
      get_json(store.as_ref(), db::keys::FILTERS).unwrap_or_default();
    let mode = get_json::<String>(store.as_ref(), db::keys::PRACTICE_MODE)
      .and_then(|s| PracticeMode::from_str(&s))
      .unwrap_or(PracticeMode::Shuffle);
    let boxes = get_json::<HashMap<String, i64>>(
      store.as_ref(),
      db::keys::LEITNER_BOXES,
    )
    .map(LeitnerBoxes::from_map)
    .unwrap_or_default();
    let history =
      get_json(store.as_ref(), db::keys::HISTORY).unwrap_or_default();
    let session = get_json(store.as_ref(), db::keys::SESSION)
      .unwrap_or_else(SessionStats::new);
    let streak_reset_at =
      get_json::<Option<DateTime<Utc>>>(store.as_ref(), db::keys::STREAK_RESET_AT)
        .flatten();

    let mut trainer = Self {
      cards,
      pool: Vec::new(),
      filters,
      mode,
      boxes,
      deck: Deck::default(),
      smart_queue: Vec::new(),
      smart_idx: None,
      revealed: false,
      last_result: None,
      session,
      history,
      streak_reset_at,
      store,
    };
    trainer.rebuild();
    trainer
  }

  fn rebuild(&mut self) {
    self.pool = filter::apply(&self.cards, &self.filters);
    self.smart_queue.clear();
    self.smart_idx = None;
    self.revealed = false;
    self.last_result = None;
    let mut rng = rand::rng();
    self.deck = Deck::build(self.pool.len(), &mut rng);
    if self.mode == PracticeMode::Smart && !self.pool.is_empty() {
      self.smart_idx = Some(srs::leitner::pick_next(
        &self.pool,
        &self.boxes,
        &mut self.smart_queue,
        None,
        &mut rng,
      ));
    }
  }

  pub fn pool_size(&self) -> usize {
    self.pool.len()
  }

  pub fn mode(&self) -> PracticeMode {
    self.mode
  }

  pub fn filters(&self) -> &FilterState {
    &self.filters
  }

  pub fn session(&self) -> &SessionStats {
    &self.session
  }

  pub fn revealed(&self) -> bool {
    self.revealed
  }

  pub fn current_index(&self) -> Option<usize> {
    match self.mode {
      PracticeMode::Smart => self.smart_idx,
      PracticeMode::Shuffle => self.deck.current(),
    }
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.current_index().and_then(|i| self.pool.get(i))
  }

  /// Position label for the practice surface: deck position in shuffle
  /// mode, nothing meaningful in smart mode.
  pub fn position(&self) -> Option<(usize, usize)> {
    match self.mode {
      PracticeMode::Shuffle => {
        self.deck.current().map(|_| (self.deck.cursor_pos() + 1, self.deck.len()))
      }
      PracticeMode::Smart => None,
    }
  }

  fn feedback(card: &Card, result: ReviewResult) -> Feedback {
    Feedback {
      result,
      expected: card.answer.clone(),
      full_sentence: card.full_sentence(),
      outcome: card.outcome,
      why: card.why.clone(),
      translate: card.translate.clone(),
    }
  }

  fn record(&mut self, result: ReviewResult, got: &str) -> Option<Feedback> {
    let idx = self.current_index()?;
    let card = self.pool.get(idx)?.clone();

    let ev = ReviewEvent {
      result,
      outcome: card.outcome,
      category: card.rule_category.clone(),
      card_id: card.id.clone(),
      used_reveal: self.revealed,
    };
    self.session.record(&ev);

    if result.is_scored() {
      self.boxes.update(&card.id, result);
      push_history(
        &mut self.history,
        HistoryEntry {
          t: Utc::now(),
          ok: result == ReviewResult::Correct,
          key: format!(
            "{}:{}:{}",
            card.rule_category, card.trigger_canon, card.base
          ),
          card_id: card.id.clone(),
          expected: card.answer.clone(),
          got: got.to_string(),
          outcome: card.outcome,
          mode: self.mode,
          skipped: result == ReviewResult::Skipped,
        },
      );
      if result != ReviewResult::Correct
        && self.mode == PracticeMode::Smart
        && self.pool.len() > 1
      {
        self.smart_queue.push(QueueEntry {
          index: idx,
          due_after: crate::config::SMART_REQUEUE_DELAY,
        });
      }
      self.last_result = Some(result);
    }

    self.persist_progress();
    Some(Self::feedback(&card, result))
  }

  /// Check a typed answer against the current card. A second check on the
  /// same card returns the original verdict without double-counting.
  pub fn check(&mut self, guess: &str) -> Option<Feedback> {
    if let Some(prev) = self.last_result {
      let card = self.current_card()?.clone();
      return Some(Self::feedback(&card, prev));
    }
    let expected = self.current_card()?.answer.clone();
    let result = if validation::check_answer(guess, &expected) {
      ReviewResult::Correct
    } else {
      ReviewResult::Wrong
    };
    self.record(result, guess)
  }

  /// Skip the current card. Counts as done, breaks the streak, demotes.
  pub fn skip(&mut self) -> Option<Feedback> {
    if self.last_result.is_some() {
      // Already scored; skipping now just moves on.
      self.advance();
      return None;
    }
    let fb = self.record(ReviewResult::Skipped, "")?;
    self.advance();
    Some(fb)
  }

  /// Reveal the answer. Breaks the streak but scores nothing; a correct
  /// answer typed afterwards will not extend the streak either.
  pub fn reveal(&mut self) -> Option<Feedback> {
    let card = self.current_card()?.clone();
    if !self.revealed && self.last_result.is_none() {
      self.revealed = true;
      let ev = ReviewEvent {
        result: ReviewResult::Revealed,
        outcome: card.outcome,
        category: card.rule_category.clone(),
        card_id: card.id.clone(),
        used_reveal: true,
      };
      self.session.record(&ev);
      self.persist_progress();
    }
    Some(Self::feedback(&card, ReviewResult::Revealed))
  }

  /// Move to the next card. In shuffle mode a just-missed card is pulled
  /// forward in the deck first; in smart mode the weighted draw runs.
  pub fn advance(&mut self) -> Option<usize> {
    if self.pool.is_empty() {
      return None;
    }
    let last = self.current_index();
    match self.mode {
      PracticeMode::Shuffle => {
        let missed = matches!(
          self.last_result,
          Some(ReviewResult::Wrong) | Some(ReviewResult::Skipped)
        );
        if missed {
          if let Some(idx) = last {
            // Reinsertion leaves the cursor on the following card.
            self.deck.reinsert_after_miss(idx);
          }
        } else {
          self.deck.advance(1);
        }
      }
      PracticeMode::Smart => {
        let mut rng = rand::rng();
        self.smart_idx = Some(srs::leitner::pick_next(
          &self.pool,
          &self.boxes,
          &mut self.smart_queue,
          last,
          &mut rng,
        ));
      }
    }
    self.revealed = false;
    self.last_result = None;
    self.current_index()
  }

  /// Reshuffle the deck and start from the top.
  pub fn reshuffle(&mut self) {
    self.rebuild();
  }

  pub fn set_mode(&mut self, mode: PracticeMode) {
    if self.mode == mode {
      return;
    }
    self.mode = mode;
    self.rebuild();
    set_json(
      self.store.as_mut(),
      db::keys::PRACTICE_MODE,
      &mode.as_str().to_string(),
    );
  }

  /// Replace the user filter layer; the pack layer is untouched.
  pub fn set_user_filters(
    &mut self,
    families: Vec<RuleFamily>,
    categories: Vec<String>,
    trigger_query: String,
    nil_only: bool,
  ) {
    self.filters.families = if families.is_empty() {
      filter::ALL_FAMILIES.to_vec()
    } else {
      families
    };
    self.filters.categories = categories;
    self.filters.trigger_query = trigger_query;
    self.filters.nil_only = nil_only;
    self.rebuild();
    self.persist_filters();
  }

  pub fn clear_user_filters(&mut self) {
    self.filters.reset_user_filters();
    self.rebuild();
    self.persist_filters();
  }

  /// Select a pack by id. Resets the user filter layer.
  pub fn apply_pack(&mut self, pack_id: &str) -> bool {
    let Some(def) = packs::find(pack_id) else {
      tracing::warn!("unknown pack '{}'", pack_id);
      return false;
    };
    self.filters.apply_pack(def);
    self.rebuild();
    self.persist_filters();
    true
  }

  /// Deselect the pack, keeping any user filters set while it was active.
  pub fn clear_pack(&mut self) {
    self.filters.clear_pack();
    self.rebuild();
    self.persist_filters();
  }

  pub fn new_session(&mut self) {
    self.session = SessionStats::new();
    self.rebuild();
    set_json(self.store.as_mut(), db::keys::SESSION, &self.session);
  }

  pub fn reset_streak(&mut self) {
    self.session.reset_streak();
    self.streak_reset_at = Some(Utc::now());
    set_json(self.store.as_mut(), db::keys::SESSION, &self.session);
    set_json(
      self.store.as_mut(),
      db::keys::STREAK_RESET_AT,
      &self.streak_reset_at,
    );
  }

  /// Wipe all persisted state and start from scratch.
  pub fn reset_device(&mut self) {
    self.store.clear();
    self.boxes = LeitnerBoxes::new();
    self.history.clear();
    self.session = SessionStats::new();
    self.filters = FilterState::default();
    self.mode = PracticeMode::Shuffle;
    self.streak_reset_at = None;
    self.rebuild();
    tracing::info!("device state reset");
  }

  pub fn mastery(&self) -> (usize, usize) {
    crate::session::mastery(&self.pool, &self.boxes)
  }

  pub fn box_counts(&self) -> [usize; 6] {
    self.boxes.counts(&self.pool)
  }

  pub fn history(&self) -> &[HistoryEntry] {
    &self.history
  }

  pub fn lifetime_stats(&self) -> LifetimeStats {
    let attempts = self.history.len();
    let correct = self.history.iter().filter(|h| h.ok).count();
    let skipped = self.history.iter().filter(|h| h.skipped).count();
    let accuracy = if attempts == 0 {
      0
    } else {
      ((correct as f64 / attempts as f64) * 100.0).round() as u32
    };
    let mut by_outcome: HashMap<String, Tally> = HashMap::new();
    for h in &self.history {
      let tally = by_outcome.entry(h.outcome.as_str().to_string()).or_default();
      tally.done += 1;
      if h.ok {
        tally.correct += 1;
      }
    }
    LifetimeStats {
      attempts,
      correct,
      skipped,
      accuracy,
      by_outcome,
    }
  }

  fn persist_filters(&mut self) {
    set_json(self.store.as_mut(), db::keys::FILTERS, &self.filters);
  }

  fn persist_progress(&mut self) {
    set_json(
      self.store.as_mut(),
      db::keys::LEITNER_BOXES,
      self.boxes.to_map(),
    );
    set_json(self.store.as_mut(), db::keys::HISTORY, &self.history);
    set_json(self.store.as_mut(), db::keys::SESSION, &self.session);
  }
}

/// Shared handle the router clones into every handler.
#[derive(Clone)]
pub struct AppState {
  pub trainer: Arc<Mutex<Trainer>>,
}

impl AppState {
  pub fn new(trainer: Trainer) -> Self {
    Self {
      trainer: Arc::new(Mutex::new(trainer)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::{load, seed_rows};
  use crate::db::MemoryStore;
  use crate::domain::RuleFamily;

  fn trainer() -> Trainer {
    Trainer::new(load(&seed_rows()), Box::new(MemoryStore::new()))
  }

  #[test]
  fn test_new_trainer_has_full_pool_and_card() {
    let t = trainer();
    assert!(t.pool_size() > 0);
    assert!(t.current_card().is_some());
  }

  #[test]
  fn test_correct_answer_flow() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    let fb = t.check(&expected).unwrap();
    assert_eq!(fb.result, ReviewResult::Correct);
    assert_eq!(t.session().done, 1);
    assert_eq!(t.session().correct, 1);
    assert_eq!(t.session().streak, 1);
    assert_eq!(t.history().len(), 1);
  }

  #[test]
  fn test_double_check_does_not_double_count() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    t.check(&expected).unwrap();
    let again = t.check("anything").unwrap();
    assert_eq!(again.result, ReviewResult::Correct);
    assert_eq!(t.session().done, 1);
    assert_eq!(t.history().len(), 1);
  }

  #[test]
  fn test_wrong_answer_demotes_and_breaks_streak() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    t.check(&expected).unwrap();
    t.advance();
    let fb = t.check("llwyr anghywir").unwrap();
    assert_eq!(fb.result, ReviewResult::Wrong);
    assert_eq!(t.session().streak, 0);
    assert_eq!(t.session().best_streak, 1);
  }

  #[test]
  fn test_reveal_then_correct_gives_no_streak() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    t.reveal().unwrap();
    let fb = t.check(&expected).unwrap();
    assert_eq!(fb.result, ReviewResult::Correct);
    assert_eq!(t.session().correct, 1);
    assert_eq!(t.session().streak, 0);
  }

  #[test]
  fn test_skip_advances_and_counts() {
    let mut t = trainer();
    let before = t.current_card().unwrap().id.clone();
    t.skip().unwrap();
    assert_eq!(t.session().done, 1);
    assert_eq!(t.session().correct, 0);
    let after = t.current_card().unwrap().id.clone();
    assert_ne!(before, after);
  }

  #[test]
  fn test_advance_clears_reveal_state() {
    let mut t = trainer();
    t.reveal().unwrap();
    assert!(t.revealed());
    t.advance();
    assert!(!t.revealed());
  }

  #[test]
  fn test_filter_to_empty_pool() {
    let mut t = trainer();
    t.set_user_filters(
      Vec::new(),
      vec!["NoSuchCategory".to_string()],
      String::new(),
      false,
    );
    assert_eq!(t.pool_size(), 0);
    assert!(t.current_card().is_none());
    assert!(t.check("x").is_none());
    assert!(t.advance().is_none());
  }

  #[test]
  fn test_pack_apply_and_clear() {
    let mut t = trainer();
    t.set_user_filters(
      vec![RuleFamily::Nasal],
      Vec::new(),
      String::new(),
      false,
    );
    let narrowed = t.pool_size();
    assert!(narrowed < load(&seed_rows()).len());

    assert!(t.apply_pack("starter-preps"));
    // Pack selection wipes the user layer
    assert_eq!(t.filters().families.len(), 4);
    assert!(t.pool_size() > 0);
    assert!(t.pool_size() <= load(&seed_rows()).len());

    t.set_user_filters(
      vec![RuleFamily::Soft],
      Vec::new(),
      String::new(),
      false,
    );
    t.clear_pack();
    // Clearing the pack keeps the user layer
    assert_eq!(t.filters().families, vec![RuleFamily::Soft]);
  }

  #[test]
  fn test_unknown_pack_rejected() {
    let mut t = trainer();
    assert!(!t.apply_pack("no-such-pack"));
  }

  #[test]
  fn test_persistence_roundtrip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.db");
    let path_str = path.to_str().unwrap();
    {
      let store = crate::db::SqliteStore::open(path_str).unwrap();
      let mut t = Trainer::new(load(&seed_rows()), Box::new(store));
      let expected = t.current_card().unwrap().answer.clone();
      t.check(&expected).unwrap();
      t.set_mode(PracticeMode::Smart);
      assert!(t.apply_pack("numbers-1-10"));
    }
    let store = crate::db::SqliteStore::open(path_str).unwrap();
    let t = Trainer::new(load(&seed_rows()), Box::new(store));
    assert_eq!(t.mode(), PracticeMode::Smart);
    assert_eq!(
      t.filters().pack.as_ref().map(|p| p.pack_id.as_str()),
      Some("numbers-1-10")
    );
    assert_eq!(t.session().done, 1);
    assert_eq!(t.history().len(), 1);
  }

  #[test]
  fn test_reset_device_wipes_everything() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    t.check(&expected).unwrap();
    assert!(t.apply_pack("articles"));
    t.reset_device();
    assert_eq!(t.session().done, 0);
    assert!(t.history().is_empty());
    assert!(t.filters().pack.is_none());
    assert_eq!(t.mode(), PracticeMode::Shuffle);
    assert_eq!(t.pool_size(), load(&seed_rows()).len());
  }

  #[test]
  fn test_smart_mode_picks_cards() {
    let mut t = trainer();
    t.set_mode(PracticeMode::Smart);
    assert!(t.current_card().is_some());
    let first = t.current_index();
    t.advance();
    assert!(t.current_card().is_some());
    // With a pool this size an immediate repeat is avoided
    assert_ne!(t.current_index(), first);
  }

  #[test]
  fn test_lifetime_stats() {
    let mut t = trainer();
    let expected = t.current_card().unwrap().answer.clone();
    t.check(&expected).unwrap();
    t.advance();
    t.check("anghywir").unwrap();
    t.advance();
    t.skip().unwrap();
    let stats = t.lifetime_stats();
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.correct, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.accuracy, 33);
  }
}
