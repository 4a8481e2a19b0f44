//! Which results a student may see, given when they were admitted.

use gradeline_models::{AcademicSession, Student, TermName};

/// Admission window of one student.
#[derive(Debug, Clone, Copy)]
pub struct ResultVisibility<'a> {
    admission: Option<(&'a AcademicSession, Option<TermName>)>,
}

impl<'a> ResultVisibility<'a> {
    /// Look the student's admission session up in `sessions`. A student
    /// without one, or whose admission session no longer exists, sees all
    /// results.
    pub fn for_student(student: &Student, sessions: &'a [AcademicSession]) -> Self {
        let admission = student
            .admission_academic_session_id
            .and_then(|id| sessions.iter().find(|s| s.id == id))
            .map(|session| (session, student.admission_term));

        Self { admission }
    }

    /// Sessions starting after the admission session are visible in full. In
    /// the admission session itself only the admission term onwards is.
    pub fn allows(&self, session: &AcademicSession, term: TermName) -> bool {
        let Some((admitted, admission_term)) = self.admission else {
            return true;
        };

        if session.id == admitted.id {
            return admission_term.is_none_or(|first_visible| term >= first_visible);
        }

        session.start_date > admitted.start_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use gradeline_models::{AcademicSessionId, ClassId, StudentId, StudentStatus};

    fn session(start_year: i32) -> AcademicSession {
        let now = Utc::now();
        AcademicSession {
            id: AcademicSessionId::new(),
            name: format!("{}/{}", start_year, start_year + 1),
            start_date: NaiveDate::from_ymd_opt(start_year, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(start_year + 1, 7, 31).unwrap(),
            is_current: false,
            is_manual: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn student(session: Option<AcademicSessionId>, term: Option<TermName>) -> Student {
        let now = Utc::now();
        Student {
            id: StudentId::new(),
            first_name: "Tobi".into(),
            last_name: "Ade".into(),
            admission_number: None,
            class_id: ClassId::new(),
            admission_academic_session_id: session,
            admission_term: term,
            status: StudentStatus::Active,
            promoted_this_session: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admission_term_window() {
        let sessions = vec![session(2023), session(2024), session(2025)];
        let admitted = &sessions[1];

        let second = student(Some(admitted.id), Some(TermName::Second));
        let view = ResultVisibility::for_student(&second, &sessions);

        assert!(!view.allows(&sessions[0], TermName::Third));
        assert!(!view.allows(admitted, TermName::First));
        assert!(view.allows(admitted, TermName::Second));
        assert!(view.allows(admitted, TermName::Third));
        assert!(view.allows(&sessions[2], TermName::First));

        let third = student(Some(admitted.id), Some(TermName::Third));
        let view = ResultVisibility::for_student(&third, &sessions);
        assert!(!view.allows(admitted, TermName::Second));
        assert!(view.allows(admitted, TermName::Third));
    }

    #[test]
    fn test_missing_admission_term_shows_whole_session() {
        let sessions = vec![session(2024)];
        let s = student(Some(sessions[0].id), None);
        let view = ResultVisibility::for_student(&s, &sessions);
        assert!(view.allows(&sessions[0], TermName::First));
    }

    #[test]
    fn test_no_admission_session_sees_everything() {
        let sessions = vec![session(2020), session(2024)];
        let view = ResultVisibility::for_student(&student(None, None), &sessions);
        assert!(view.allows(&sessions[0], TermName::First));

        let orphaned = student(Some(AcademicSessionId::new()), Some(TermName::Third));
        let view = ResultVisibility::for_student(&orphaned, &sessions);
        assert!(view.allows(&sessions[0], TermName::First));
    }
}
