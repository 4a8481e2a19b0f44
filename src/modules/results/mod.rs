//! Results module.
//!
//! Class positions, report card data and the admission-based visibility
//! window. Rendering is left to consumers.

pub mod ranking;
pub mod service;
pub mod visibility;

pub use ranking::{RankingEngine, format_rank_label, ordinal};
pub use service::{RankingsCache, ResultsService};
pub use visibility::ResultVisibility;
