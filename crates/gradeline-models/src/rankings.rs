//! Ranking output types.

use crate::ids::{AcademicSessionId, ClassId, StudentId, SubjectId};
use crate::terms::TermName;
use serde::{Deserialize, Serialize};

/// Rank of one entity in its cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position<K> {
    pub id: K,
    pub score: f64,
    /// Competition rank (1, 1, 3, ...).
    pub rank: u32,
    /// "1st / 10" for the top three, "Top 40%" otherwise.
    pub label: String,
}

/// Ranking of a class for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRanking {
    pub subject_id: SubjectId,
    pub positions: Vec<Position<StudentId>>,
}

/// Subject and overall rankings for a `(class, term, session)` cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRankings {
    pub class_id: ClassId,
    pub academic_session_id: AcademicSessionId,
    pub term: TermName,
    pub subjects: Vec<SubjectRanking>,
    /// Ranked on the sum of each student's subject totals.
    pub overall: Vec<Position<StudentId>>,
}

impl ClassRankings {
    pub fn subject_position(
        &self,
        subject_id: SubjectId,
        student_id: StudentId,
    ) -> Option<&Position<StudentId>> {
        self.subjects
            .iter()
            .find(|s| s.subject_id == subject_id)?
            .positions
            .iter()
            .find(|p| p.id == student_id)
    }

    pub fn overall_position(&self, student_id: StudentId) -> Option<&Position<StudentId>> {
        self.overall.iter().find(|p| p.id == student_id)
    }
}
