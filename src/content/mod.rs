pub mod cards;
pub mod discovery;
pub mod normalize;
pub mod packs;

pub use cards::{coerce_row, load, seed_rows, RawRow};
pub use normalize::{canonical_trigger, normalize};
pub use packs::PackDef;
