//! # Gradeline Models
//!
//! Domain models and DTOs for Gradeline.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed UUID ids
//! - [`periods`]: Derived session/term status
//! - [`academic_sessions`]: Academic sessions and session DTOs
//! - [`terms`]: Terms and term names
//! - [`classes`]: School classes and subjects
//! - [`students`]: Students, status and update patches
//! - [`scores`]: Score sheets and score filters
//! - [`grading`]: Grading tables
//! - [`promotion_rules`]: Promotion rules and criteria
//! - [`class_history`]: Per-session class membership
//! - [`rankings`]: Ranking output
//! - [`promotions`]: Promotion run summary
//! - [`reports`]: Report card data
//!
//! # Example
//!
//! ```ignore
//! use gradeline_models::{PromotionRuleKind, TermName};
//!
//! let kind = PromotionRuleKind::from("minimum_average");
//! let term: TermName = "second".parse()?;
//! ```

pub mod academic_sessions;
pub mod class_history;
pub mod classes;
pub mod grading;
pub mod ids;
pub mod periods;
pub mod promotion_rules;
pub mod promotions;
pub mod rankings;
pub mod reports;
pub mod scores;
pub mod students;
pub mod terms;

pub use ids::*;

pub use academic_sessions::{
    AcademicSession, CreateAcademicSessionDto, CurrentPeriod, NewAcademicSession, SessionOverview,
};
pub use class_history::StudentClassHistory;
pub use classes::{SchoolClass, Subject};
pub use grading::{GradeBand, GradeMark, GradingConfiguration};
pub use periods::{CurrentFlags, PeriodStatus, WithStatus};
pub use promotion_rules::{
    CreatePromotionRuleDto, PromotionCriteria, PromotionRule, PromotionRuleKind,
};
pub use promotions::{PromotionOutcome, PromotionSummary, RunPromotionDto, StudentPromotion};
pub use rankings::{ClassRankings, Position, SubjectRanking};
pub use reports::{
    PromotionStanding, SessionAverages, SessionResults, StudentResults, StudentTermReport,
    SubjectLine, TermResults,
};
pub use scores::{NewScore, RecordScoreDto, Score, ScoreComponents, ScoreFilter};
pub use students::{Student, StudentFilter, StudentPatch, StudentStatus};
pub use terms::{Term, TermName, TermWindow};
