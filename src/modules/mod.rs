pub mod academic_sessions;
pub mod promotions;
pub mod results;
pub mod scores;

pub use self::academic_sessions::AcademicSessionService;
pub use self::promotions::{PromotionOrchestrator, PromotionService};
pub use self::results::{RankingsCache, ResultsService};
pub use self::scores::ScoreService;
