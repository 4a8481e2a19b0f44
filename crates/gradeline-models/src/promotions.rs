//! Promotion run inputs and outputs.

use crate::ids::{AcademicSessionId, ClassId, StudentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one student during a promotion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionOutcome {
    Promoted,
    Repeated,
    Graduated,
    /// No results for the session; the student was left untouched.
    Skipped,
}

impl PromotionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promoted => "promoted",
            Self::Repeated => "repeated",
            Self::Graduated => "graduated",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PromotionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunPromotionDto {
    pub academic_session_id: AcademicSessionId,
    /// Restrict the run to one class.
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPromotion {
    pub student_id: StudentId,
    pub outcome: PromotionOutcome,
    pub from_class_id: ClassId,
    pub to_class_id: ClassId,
}

/// Counters returned by a promotion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionSummary {
    pub promoted: usize,
    pub repeated: usize,
    pub graduated: usize,
    pub skipped: usize,
    /// Students considered, skipped ones included.
    pub total: usize,
    pub students: Vec<StudentPromotion>,
}

impl PromotionSummary {
    pub fn record(&mut self, promotion: StudentPromotion) {
        match promotion.outcome {
            PromotionOutcome::Promoted => self.promoted += 1,
            PromotionOutcome::Repeated => self.repeated += 1,
            PromotionOutcome::Graduated => self.graduated += 1,
            PromotionOutcome::Skipped => self.skipped += 1,
        }
        self.total += 1;
        self.students.push(promotion);
    }

    pub fn outcome_for(&self, student_id: StudentId) -> Option<PromotionOutcome> {
        self.students
            .iter()
            .find(|s| s.student_id == student_id)
            .map(|s| s.outcome)
    }
}
