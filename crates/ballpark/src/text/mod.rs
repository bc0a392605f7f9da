//! ASCII clean-up for names and positions coming from the stats feed.

mod normalizer;
pub mod rules;

pub use normalizer::{normalize, Normalized, TextNormalizer};
pub use rules::{RepairRule, FALLBACK_LETTER, REPAIR_RULES, SPECIAL_LETTERS};
