//! Score sheet models.
//!
//! A score row holds one student's continuous assessments and exam mark for one
//! subject in one term. `total_score`, `grade` and `remark` are derived values;
//! readers must tolerate them being absent on legacy rows.

use crate::ids::{AcademicSessionId, ClassId, ScoreId, StudentId, SubjectId};
use crate::terms::TermName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub id: ScoreId,
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    /// Class the student sat in when the score was recorded.
    pub class_id: ClassId,
    pub academic_session_id: AcademicSessionId,
    pub term: TermName,
    pub first_ca: Option<f64>,
    pub second_ca: Option<f64>,
    pub exam_score: Option<f64>,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    pub remark: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Score {
    pub fn components(&self) -> ScoreComponents {
        ScoreComponents {
            first_ca: self.first_ca,
            second_ca: self.second_ca,
            exam_score: self.exam_score,
        }
    }
}

/// The three raw marks of a score sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub first_ca: Option<f64>,
    pub second_ca: Option<f64>,
    pub exam_score: Option<f64>,
}

impl ScoreComponents {
    pub fn new(first_ca: Option<f64>, second_ca: Option<f64>, exam_score: Option<f64>) -> Self {
        Self {
            first_ca,
            second_ca,
            exam_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_ca.is_none() && self.second_ca.is_none() && self.exam_score.is_none()
    }
}

/// Filters accepted by the score store. Every `None` field matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreFilter {
    pub student_id: Option<StudentId>,
    pub class_id: Option<ClassId>,
    pub subject_id: Option<SubjectId>,
    pub academic_session_id: Option<AcademicSessionId>,
    pub term: Option<TermName>,
    pub is_active: Option<bool>,
}

impl ScoreFilter {
    /// Filter restricted to active score rows.
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn student(mut self, student_id: StudentId) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn class(mut self, class_id: ClassId) -> Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn subject(mut self, subject_id: SubjectId) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn session(mut self, session_id: AcademicSessionId) -> Self {
        self.academic_session_id = Some(session_id);
        self
    }

    pub fn term(mut self, term: TermName) -> Self {
        self.term = Some(term);
        self
    }

    pub fn matches(&self, score: &Score) -> bool {
        self.student_id.is_none_or(|id| score.student_id == id)
            && self.class_id.is_none_or(|id| score.class_id == id)
            && self.subject_id.is_none_or(|id| score.subject_id == id)
            && self
                .academic_session_id
                .is_none_or(|id| score.academic_session_id == id)
            && self.term.is_none_or(|term| score.term == term)
            && self.is_active.is_none_or(|active| score.is_active == active)
    }
}

/// DTO for recording (creating or replacing) a score sheet.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordScoreDto {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    /// Defaults to the student's current class.
    pub class_id: Option<ClassId>,
    /// Defaults to the current session.
    pub academic_session_id: Option<AcademicSessionId>,
    pub term: TermName,
    #[validate(range(min = 0.0, max = 100.0))]
    pub first_ca: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub second_ca: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub exam_score: Option<f64>,
}

impl RecordScoreDto {
    pub fn components(&self) -> ScoreComponents {
        ScoreComponents::new(self.first_ca, self.second_ca, self.exam_score)
    }
}

/// Fully resolved score row ready to be upserted on
/// `(student, subject, class, session, term)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub academic_session_id: AcademicSessionId,
    pub term: TermName,
    pub components: ScoreComponents,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    pub remark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(first_ca: Option<f64>, exam_score: Option<f64>) -> RecordScoreDto {
        RecordScoreDto {
            student_id: StudentId::new(),
            subject_id: SubjectId::new(),
            class_id: None,
            academic_session_id: None,
            term: TermName::First,
            first_ca,
            second_ca: None,
            exam_score,
        }
    }

    #[test]
    fn test_record_score_dto_range_validation() {
        assert!(dto(Some(15.0), Some(60.0)).validate().is_ok());
        assert!(dto(None, None).validate().is_ok());
        assert!(dto(Some(-1.0), None).validate().is_err());
        assert!(dto(None, Some(100.5)).validate().is_err());
    }

    #[test]
    fn test_empty_filter_matches_everything_active_filter_does_not() {
        let now = Utc::now();
        let score = Score {
            id: ScoreId::new(),
            student_id: StudentId::new(),
            subject_id: SubjectId::new(),
            class_id: ClassId::new(),
            academic_session_id: AcademicSessionId::new(),
            term: TermName::Second,
            first_ca: None,
            second_ca: None,
            exam_score: None,
            total_score: None,
            grade: None,
            remark: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        };

        assert!(ScoreFilter::default().matches(&score));
        assert!(!ScoreFilter::active().matches(&score));
        assert!(
            ScoreFilter::default()
                .student(score.student_id)
                .term(TermName::Second)
                .matches(&score)
        );
        assert!(!ScoreFilter::default().term(TermName::First).matches(&score));
    }
}
