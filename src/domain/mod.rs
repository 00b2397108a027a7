pub mod card;
pub mod review;

pub use card::{Card, Outcome, RuleFamily};
pub use review::{push_history, HistoryEntry, ReviewEvent, ReviewResult};
