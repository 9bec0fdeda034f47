pub mod ladder;

pub use ladder::{compute_next_review, compute_next_review_at, confidence_level, interval_days};
