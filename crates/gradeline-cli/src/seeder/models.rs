//! Data models for database seeding configuration.

use gradeline_models::{AcademicSessionId, ClassId, StudentId, SubjectId, TermName};

/// Prefix of every seeded admission number. `clear` only removes students
/// carrying it.
pub const ADMISSION_PREFIX: &str = "SEED-";

/// The standard class ladder, lowest first.
pub const CLASS_LADDER: [&str; 14] = [
    "Nursery 1",
    "Nursery 2",
    "Primary 1",
    "Primary 2",
    "Primary 3",
    "Primary 4",
    "Primary 5",
    "Primary 6",
    "JSS 1",
    "JSS 2",
    "JSS 3",
    "SS 1",
    "SS 2",
    "SS 3",
];

/// (name, code)
pub const SUBJECTS: [(&str, &str); 8] = [
    ("Mathematics", "MTH"),
    ("English Language", "ENG"),
    ("Basic Science", "BSC"),
    ("Social Studies", "SOS"),
    ("Civic Education", "CVE"),
    ("Computer Studies", "CMP"),
    ("Agricultural Science", "AGR"),
    ("Creative Arts", "CCA"),
];

/// Seed data for creating a student.
pub struct StudentSeed {
    pub first_name: String,
    pub last_name: String,
    pub admission_number: String,
    pub class_id: ClassId,
    pub admission_academic_session_id: AcademicSessionId,
    pub admission_term: TermName,
}

/// Seed data for one score sheet. Totals and grades are derived before insert.
pub struct ScoreSeed {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub academic_session_id: AcademicSessionId,
    pub term: TermName,
    pub first_ca: f64,
    pub second_ca: f64,
    pub exam_score: f64,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    pub remark: Option<String>,
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub students_per_class: usize,
    /// Calendar year the seeded session starts in (September to July).
    pub session_start_year: i32,
    pub with_scores: bool,
}

impl SeedConfig {
    pub fn new(students_per_class: usize) -> Self {
        Self {
            students_per_class,
            ..Default::default()
        }
    }

    pub fn with_session_year(mut self, year: i32) -> Self {
        self.session_start_year = year;
        self
    }

    pub fn without_scores(mut self) -> Self {
        self.with_scores = false;
        self
    }

    pub fn session_name(&self) -> String {
        format!("{}/{}", self.session_start_year, self.session_start_year + 1)
    }

    /// Total students across the ladder.
    pub fn total_students(&self) -> usize {
        CLASS_LADDER.len() * self.students_per_class
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            students_per_class: 20,
            session_start_year: 2024,
            with_scores: true,
        }
    }
}
