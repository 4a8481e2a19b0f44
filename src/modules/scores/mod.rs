//! Scores module.
//!
//! Grading tables, total/grade derivation and score recording.

pub mod grading;
pub mod service;

pub use grading::{GradingTable, derive_total_and_grade};
pub use service::ScoreService;
