//! Result report data.
//!
//! These are the structures a report card or results page is rendered from.
//! Rendering itself happens elsewhere.

use crate::academic_sessions::AcademicSession;
use crate::classes::SchoolClass;
use crate::ids::SubjectId;
use crate::scores::Score;
use crate::students::{Student, StudentStatus};
use crate::terms::TermName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One subject row on a term report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectLine {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub first_ca: Option<f64>,
    pub second_ca: Option<f64>,
    pub exam_score: Option<f64>,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    pub remark: Option<String>,
    /// Position among classmates for this subject.
    pub position: Option<String>,
}

/// Per-term averages shown on a third-term report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionAverages {
    /// `None` when the student has no scores for that term.
    pub first_term_average: Option<f64>,
    pub second_term_average: Option<f64>,
    pub third_term_average: f64,
    /// Mean of the three term averages, 2 dp. Only set when all three exist.
    pub final_average: Option<f64>,
}

/// Promotion standing shown on a third-term report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionStanding {
    Graduated,
    Repeated,
    Promoted,
}

impl PromotionStanding {
    /// Standing of a student after a promotion run; `None` while no run has
    /// touched them this session.
    pub fn of(student: &Student) -> Option<Self> {
        match student.status {
            StudentStatus::Graduated => Some(Self::Graduated),
            StudentStatus::Repeated => Some(Self::Repeated),
            StudentStatus::Active if student.promoted_this_session => Some(Self::Promoted),
            StudentStatus::Active => None,
        }
    }
}

impl fmt::Display for PromotionStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Graduated => "graduated",
            Self::Repeated => "repeated",
            Self::Promoted => "promoted",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentTermReport {
    pub student: Student,
    pub academic_session: AcademicSession,
    /// Class the student was in during the session.
    pub class: SchoolClass,
    pub term: TermName,
    pub subjects: Vec<SubjectLine>,
    pub total_score: f64,
    /// Mean subject total, 2 dp. Zero when there are no subjects.
    pub average_score: f64,
    pub overall_grade: String,
    pub overall_position: Option<String>,
    /// Third term only, when all three term averages exist.
    pub session_averages: Option<SessionAverages>,
    /// Third term only.
    pub promotion_status: Option<PromotionStanding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermResults {
    pub term: TermName,
    pub scores: Vec<Score>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResults {
    pub academic_session: AcademicSession,
    /// As-of class for the session, when known.
    pub class: Option<SchoolClass>,
    pub terms: Vec<TermResults>,
}

/// Scores a student is allowed to see, grouped by session then term.
#[derive(Debug, Clone, Serialize)]
pub struct StudentResults {
    pub student: Student,
    pub sessions: Vec<SessionResults>,
}
