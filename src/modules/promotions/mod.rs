//! Promotions module.
//!
//! Rule evaluation, class progression and the end-of-session promotion run.

pub mod orchestrator;
pub mod progression;
pub mod rules;
pub mod service;

pub use orchestrator::PromotionOrchestrator;
pub use progression::{ClassProgressionResolver, Progression};
pub use rules::{PromotionRuleEvaluator, SubjectResult};
pub use service::PromotionService;
