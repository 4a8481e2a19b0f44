//! Vector-backed store for tests.

use chrono::Utc;

use gradeline_core::AppError;
use gradeline_models::{
    AcademicSession, AcademicSessionId, ClassId, CreatePromotionRuleDto, CurrentFlags,
    GradingConfiguration, NewAcademicSession, NewScore, PromotionRule, PromotionRuleId,
    SchoolClass, Score, ScoreFilter, ScoreId, Student, StudentClassHistory,
    StudentClassHistoryId, StudentFilter, StudentId, StudentPatch, StudentStatus, Subject, Term,
    TermId, TermWindow,
};
use sqlx::types::Json;

use super::{
    ClassDirectory, ClassHistoryStore, GradingStore, PromotionRuleStore, ScoreStore,
    SessionDirectory, StudentStore,
};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub sessions: Vec<AcademicSession>,
    pub terms: Vec<Term>,
    pub classes: Vec<SchoolClass>,
    pub subjects: Vec<Subject>,
    pub students: Vec<Student>,
    pub scores: Vec<Score>,
    pub history: Vec<StudentClassHistory>,
    pub rules: Vec<PromotionRule>,
    pub grading: Vec<GradingConfiguration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: AcademicSessionId) -> Option<&AcademicSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn history_for(
        &self,
        student_id: StudentId,
        session_id: AcademicSessionId,
    ) -> Option<&StudentClassHistory> {
        self.history
            .iter()
            .find(|h| h.student_id == student_id && h.academic_session_id == session_id)
    }
}

impl SessionDirectory for MemoryStore {
    async fn list_sessions(&mut self) -> Result<Vec<AcademicSession>, AppError> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by_key(|s| (s.start_date, s.id));
        Ok(sessions)
    }

    async fn find_session(
        &mut self,
        id: AcademicSessionId,
    ) -> Result<Option<AcademicSession>, AppError> {
        Ok(self.session(id).cloned())
    }

    async fn list_all_terms(&mut self) -> Result<Vec<Term>, AppError> {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|t| (t.start_date, t.id));
        Ok(terms)
    }

    async fn list_terms_for(&mut self, session_id: AcademicSessionId) -> Result<Vec<Term>, AppError> {
        let mut terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.academic_session_id == session_id)
            .cloned()
            .collect();
        terms.sort_by_key(|t| t.name);
        Ok(terms)
    }

    async fn current_session(&mut self) -> Result<Option<AcademicSession>, AppError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.is_current && s.is_active)
            .max_by_key(|s| s.start_date)
            .cloned())
    }

    async fn current_term(&mut self) -> Result<Option<Term>, AppError> {
        Ok(self
            .terms
            .iter()
            .filter(|t| t.is_current && t.is_active)
            .max_by_key(|t| t.start_date)
            .cloned())
    }

    async fn update_session_flags(
        &mut self,
        id: AcademicSessionId,
        flags: CurrentFlags,
    ) -> Result<(), AppError> {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            session.is_current = flags.is_current;
            session.is_manual = flags.is_manual;
            session.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_term_flags(&mut self, id: TermId, flags: CurrentFlags) -> Result<(), AppError> {
        if let Some(term) = self.terms.iter_mut().find(|t| t.id == id) {
            term.is_current = flags.is_current;
            term.is_manual = flags.is_manual;
            term.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_current_session(&mut self, id: AcademicSessionId) -> Result<(), AppError> {
        if self.session(id).is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Academic session not found"
            )));
        }

        for session in &mut self.sessions {
            if session.id == id {
                session.is_current = true;
                session.is_manual = true;
            } else {
                session.is_current = false;
                session.is_manual = false;
            }
        }
        Ok(())
    }

    async fn set_current_term(&mut self, id: TermId) -> Result<(), AppError> {
        if self.term(id).is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Term not found")));
        }

        for term in &mut self.terms {
            if term.id == id {
                term.is_current = true;
                term.is_manual = true;
            } else {
                term.is_current = false;
                term.is_manual = false;
            }
        }
        Ok(())
    }

    async fn insert_session(
        &mut self,
        session: &NewAcademicSession,
    ) -> Result<AcademicSession, AppError> {
        if self.sessions.iter().any(|s| s.name == session.name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "An academic session named '{}' already exists",
                session.name
            )));
        }

        let now = Utc::now();
        let created = AcademicSession {
            id: AcademicSessionId::new(),
            name: session.name.clone(),
            start_date: session.start_date,
            end_date: session.end_date,
            is_current: session.is_current,
            is_manual: session.is_manual,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.sessions.push(created.clone());
        Ok(created)
    }

    async fn insert_term(
        &mut self,
        session_id: AcademicSessionId,
        window: &TermWindow,
    ) -> Result<Term, AppError> {
        let now = Utc::now();
        let term = Term {
            id: TermId::new(),
            academic_session_id: session_id,
            name: window.name,
            display_name: window.name.display_name().to_string(),
            start_date: window.start_date,
            end_date: window.end_date,
            is_current: false,
            is_manual: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.terms.push(term.clone());
        Ok(term)
    }

    async fn delete_session(&mut self, id: AcademicSessionId) -> Result<bool, AppError> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.terms.retain(|t| t.academic_session_id != id);
        self.history.retain(|h| h.academic_session_id != id);
        Ok(self.sessions.len() < before)
    }
}

impl ScoreStore for MemoryStore {
    async fn query_scores(&mut self, filter: &ScoreFilter) -> Result<Vec<Score>, AppError> {
        let mut scores: Vec<Score> = self
            .scores
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        scores.sort_by_key(|s| (s.term, s.created_at, s.id));
        Ok(scores)
    }

    async fn upsert_score(&mut self, score: &NewScore) -> Result<Score, AppError> {
        let now = Utc::now();
        let existing = self.scores.iter_mut().find(|s| {
            s.student_id == score.student_id
                && s.subject_id == score.subject_id
                && s.class_id == score.class_id
                && s.academic_session_id == score.academic_session_id
                && s.term == score.term
        });

        if let Some(row) = existing {
            row.first_ca = score.components.first_ca;
            row.second_ca = score.components.second_ca;
            row.exam_score = score.components.exam_score;
            row.total_score = score.total_score;
            row.grade = score.grade.clone();
            row.remark = score.remark.clone();
            row.is_active = true;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = Score {
            id: ScoreId::new(),
            student_id: score.student_id,
            subject_id: score.subject_id,
            class_id: score.class_id,
            academic_session_id: score.academic_session_id,
            term: score.term,
            first_ca: score.components.first_ca,
            second_ca: score.components.second_ca,
            exam_score: score.components.exam_score,
            total_score: score.total_score,
            grade: score.grade.clone(),
            remark: score.remark.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.scores.push(row.clone());
        Ok(row)
    }

    async fn count_session_scores(&mut self, session_id: AcademicSessionId) -> Result<i64, AppError> {
        Ok(self
            .scores
            .iter()
            .filter(|s| s.academic_session_id == session_id)
            .count() as i64)
    }
}

impl ClassDirectory for MemoryStore {
    async fn list_active_classes(&mut self) -> Result<Vec<SchoolClass>, AppError> {
        let mut classes: Vec<SchoolClass> =
            self.classes.iter().filter(|c| c.is_active).cloned().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn find_class(&mut self, id: ClassId) -> Result<Option<SchoolClass>, AppError> {
        Ok(self.classes.iter().find(|c| c.id == id).cloned())
    }

    async fn find_class_by_name(&mut self, name: &str) -> Result<Option<SchoolClass>, AppError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .classes
            .iter()
            .find(|c| c.is_active && c.name.trim().to_lowercase() == wanted)
            .cloned())
    }

    async fn list_subjects(&mut self) -> Result<Vec<Subject>, AppError> {
        let mut subjects = self.subjects.clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }
}

impl StudentStore for MemoryStore {
    async fn list_active_students(&mut self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let mut students: Vec<Student> = self
            .students
            .iter()
            .filter(|s| s.is_active && s.status != StudentStatus::Graduated)
            .filter(|s| filter.class_id.is_none_or(|id| s.class_id == id))
            .cloned()
            .collect();
        students.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(students)
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>, AppError> {
        Ok(self.student(id).cloned())
    }

    async fn update_student(&mut self, id: StudentId, patch: &StudentPatch) -> Result<(), AppError> {
        let student = self
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;
        patch.apply(student);
        student.updated_at = Utc::now();
        Ok(())
    }
}

impl ClassHistoryStore for MemoryStore {
    async fn upsert_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
        class_id: ClassId,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        if let Some(row) = self
            .history
            .iter_mut()
            .find(|h| h.student_id == student_id && h.academic_session_id == session_id)
        {
            row.class_id = class_id;
            row.updated_at = now;
            return Ok(());
        }

        self.history.push(StudentClassHistory {
            id: StudentClassHistoryId::new(),
            student_id,
            academic_session_id: session_id,
            class_id,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn find_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
    ) -> Result<Option<StudentClassHistory>, AppError> {
        Ok(self.history_for(student_id, session_id).cloned())
    }
}

impl PromotionRuleStore for MemoryStore {
    async fn get_active_rule(&mut self) -> Result<Option<PromotionRule>, AppError> {
        Ok(self.rules.iter().find(|r| r.is_active).cloned())
    }

    async fn insert_rule(&mut self, dto: &CreatePromotionRuleDto) -> Result<PromotionRule, AppError> {
        let now = Utc::now();
        let rule = PromotionRule {
            id: PromotionRuleId::new(),
            name: dto.name.clone(),
            description: dto.description.clone(),
            kind: dto.kind.clone(),
            criteria: Json(dto.criteria.clone()),
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        self.rules.push(rule.clone());
        Ok(rule)
    }

    async fn activate_rule(&mut self, id: PromotionRuleId) -> Result<bool, AppError> {
        if !self.rules.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        for rule in &mut self.rules {
            rule.is_active = rule.id == id;
        }
        Ok(true)
    }
}

impl GradingStore for MemoryStore {
    async fn grading_for_class(
        &mut self,
        class_id: ClassId,
    ) -> Result<Option<GradingConfiguration>, AppError> {
        let listed = self
            .grading
            .iter()
            .find(|g| g.is_active && g.class_ids.contains(&class_id));
        let default = || self.grading.iter().find(|g| g.is_active && g.is_default);
        Ok(listed.or_else(default).cloned())
    }
}
