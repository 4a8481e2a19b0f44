//! Data-access seams.
//!
//! The engines and services read from and write to these traits rather than to
//! a pool directly, so a whole operation can run on one transaction
//! ([`PgStore`]) and tests can run against plain vectors (`MemoryStore`).
//!
//! All methods take `&mut self`: a store wraps a single connection or
//! transaction, and statements on it are sequential.

use std::future::Future;

use gradeline_core::AppError;
use gradeline_models::{
    AcademicSession, AcademicSessionId, ClassId, CreatePromotionRuleDto, CurrentFlags,
    GradingConfiguration, NewAcademicSession, NewScore, PromotionRule, PromotionRuleId,
    SchoolClass, Score, ScoreFilter, Student, StudentClassHistory, StudentFilter, StudentId,
    StudentPatch, Subject, Term, TermId, TermWindow,
};

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use postgres::PgStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

/// Sessions and terms.
pub trait SessionDirectory {
    /// All sessions ordered by start date.
    fn list_sessions(
        &mut self,
    ) -> impl Future<Output = Result<Vec<AcademicSession>, AppError>> + Send;

    fn find_session(
        &mut self,
        id: AcademicSessionId,
    ) -> impl Future<Output = Result<Option<AcademicSession>, AppError>> + Send;

    /// All terms of all sessions ordered by start date.
    fn list_all_terms(&mut self) -> impl Future<Output = Result<Vec<Term>, AppError>> + Send;

    /// Terms of one session in first/second/third order.
    fn list_terms_for(
        &mut self,
        session_id: AcademicSessionId,
    ) -> impl Future<Output = Result<Vec<Term>, AppError>> + Send;

    /// The active session flagged current, if any.
    fn current_session(
        &mut self,
    ) -> impl Future<Output = Result<Option<AcademicSession>, AppError>> + Send;

    /// The active term flagged current, if any.
    fn current_term(&mut self) -> impl Future<Output = Result<Option<Term>, AppError>> + Send;

    fn update_session_flags(
        &mut self,
        id: AcademicSessionId,
        flags: CurrentFlags,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn update_term_flags(
        &mut self,
        id: TermId,
        flags: CurrentFlags,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Clears the current flag and manual pin of every other session and pins
    /// the target as current. NotFound when the session does not exist.
    fn set_current_session(
        &mut self,
        id: AcademicSessionId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Clears the current flag and manual pin of every other term, across
    /// sessions, and pins the target as current. NotFound when the term does not exist.
    fn set_current_term(&mut self, id: TermId) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_session(
        &mut self,
        session: &NewAcademicSession,
    ) -> impl Future<Output = Result<AcademicSession, AppError>> + Send;

    fn insert_term(
        &mut self,
        session_id: AcademicSessionId,
        window: &TermWindow,
    ) -> impl Future<Output = Result<Term, AppError>> + Send;

    /// Deletes the session and its terms. Returns false if nothing matched.
    fn delete_session(
        &mut self,
        id: AcademicSessionId,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Score sheets.
pub trait ScoreStore {
    /// Matching scores ordered by term, then creation time.
    fn query_scores(
        &mut self,
        filter: &ScoreFilter,
    ) -> impl Future<Output = Result<Vec<Score>, AppError>> + Send;

    /// Insert or replace the score for `(student, subject, class, session, term)`.
    fn upsert_score(
        &mut self,
        score: &NewScore,
    ) -> impl Future<Output = Result<Score, AppError>> + Send;

    /// Number of score rows, active or not, referencing the session.
    fn count_session_scores(
        &mut self,
        session_id: AcademicSessionId,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;
}

/// Classes and subjects.
pub trait ClassDirectory {
    /// Active classes ordered by name.
    fn list_active_classes(
        &mut self,
    ) -> impl Future<Output = Result<Vec<SchoolClass>, AppError>> + Send;

    /// Any class by id, active or not.
    fn find_class(
        &mut self,
        id: ClassId,
    ) -> impl Future<Output = Result<Option<SchoolClass>, AppError>> + Send;

    /// Active class whose trimmed name equals `name`, ignoring case.
    fn find_class_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SchoolClass>, AppError>> + Send;

    fn list_subjects(&mut self) -> impl Future<Output = Result<Vec<Subject>, AppError>> + Send;
}

/// Students.
pub trait StudentStore {
    /// Enrolled students who have not graduated, ordered by name.
    fn list_active_students(
        &mut self,
        filter: &StudentFilter,
    ) -> impl Future<Output = Result<Vec<Student>, AppError>> + Send;

    fn find_student(
        &mut self,
        id: StudentId,
    ) -> impl Future<Output = Result<Option<Student>, AppError>> + Send;

    fn update_student(
        &mut self,
        id: StudentId,
        patch: &StudentPatch,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Per-session class membership.
pub trait ClassHistoryStore {
    fn upsert_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
        class_id: ClassId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn find_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
    ) -> impl Future<Output = Result<Option<StudentClassHistory>, AppError>> + Send;
}

/// Promotion rules.
pub trait PromotionRuleStore {
    fn get_active_rule(
        &mut self,
    ) -> impl Future<Output = Result<Option<PromotionRule>, AppError>> + Send;

    /// Inserts an inactive rule.
    fn insert_rule(
        &mut self,
        dto: &CreatePromotionRuleDto,
    ) -> impl Future<Output = Result<PromotionRule, AppError>> + Send;

    /// Deactivates every other rule and activates `id`. Returns false if the
    /// rule does not exist, in which case nothing changes.
    fn activate_rule(
        &mut self,
        id: PromotionRuleId,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Grading configurations.
pub trait GradingStore {
    /// The active configuration listing `class_id`, else the active default.
    fn grading_for_class(
        &mut self,
        class_id: ClassId,
    ) -> impl Future<Output = Result<Option<GradingConfiguration>, AppError>> + Send;
}

/// Everything a promotion run or report needs.
pub trait SchoolStore:
    SessionDirectory
    + ScoreStore
    + ClassDirectory
    + StudentStore
    + ClassHistoryStore
    + PromotionRuleStore
    + GradingStore
    + Send
{
}

impl<T> SchoolStore for T where
    T: SessionDirectory
        + ScoreStore
        + ClassDirectory
        + StudentStore
        + ClassHistoryStore
        + PromotionRuleStore
        + GradingStore
        + Send
{
}
