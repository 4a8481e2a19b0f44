use chrono::{NaiveDate, Utc};
use gradeline::modules::{AcademicSessionService, PromotionService, ScoreService};
use gradeline::store::MemoryStore;
use gradeline_models::{
    AcademicSession, ClassId, CreateAcademicSessionDto, CreatePromotionRuleDto, PromotionCriteria,
    PromotionRule, PromotionRuleKind, RecordScoreDto, SchoolClass, Student, StudentId,
    StudentStatus, Subject, SubjectId, TermName,
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// An in-memory school. Sessions, rules and scores go through the services
/// so tests see the same rows the operator commands would write.
#[allow(dead_code)]
pub struct TestSchool {
    pub store: MemoryStore,
    pub today: NaiveDate,
}

#[allow(dead_code)]
impl TestSchool {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            store: MemoryStore::new(),
            today,
        }
    }

    pub fn add_class(&mut self, name: &str) -> ClassId {
        let now = Utc::now();
        let class = SchoolClass {
            id: ClassId::new(),
            name: name.to_string(),
            form_teacher_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = class.id;
        self.store.classes.push(class);
        id
    }

    pub fn add_subject(&mut self, name: &str) -> SubjectId {
        let now = Utc::now();
        let subject = Subject {
            id: SubjectId::new(),
            name: name.to_string(),
            code: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = subject.id;
        self.store.subjects.push(subject);
        id
    }

    pub fn add_student(&mut self, first_name: &str, class_id: ClassId) -> StudentId {
        let now = Utc::now();
        let student = Student {
            id: StudentId::new(),
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            admission_number: None,
            class_id,
            admission_academic_session_id: None,
            admission_term: None,
            status: StudentStatus::Active,
            promoted_this_session: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = student.id;
        self.store.students.push(student);
        id
    }

    pub fn student(&self, id: StudentId) -> &Student {
        self.store.student(id).unwrap()
    }

    /// A September to July session created through the service.
    pub async fn add_session(&mut self, start_year: i32) -> AcademicSession {
        let dto = CreateAcademicSessionDto {
            name: format!("{}/{}", start_year, start_year + 1),
            start_date: d(start_year, 9, 1),
            end_date: d(start_year + 1, 7, 31),
            is_current: false,
        };
        AcademicSessionService::create_academic_session(&mut self.store, dto, self.today)
            .await
            .unwrap()
            .session
    }

    pub async fn add_rule(&mut self, kind: &str, criteria: PromotionCriteria) -> PromotionRule {
        let dto = CreatePromotionRuleDto {
            name: format!("{} rule", kind),
            description: None,
            kind: PromotionRuleKind::from(kind),
            criteria,
            is_active: true,
        };
        PromotionService::create_rule(&mut self.store, dto)
            .await
            .unwrap()
    }

    /// Record an exam-only sheet worth `total`.
    pub async fn record(
        &mut self,
        student_id: StudentId,
        subject_id: SubjectId,
        session: &AcademicSession,
        term: TermName,
        total: f64,
    ) {
        let dto = RecordScoreDto {
            student_id,
            subject_id,
            class_id: None,
            academic_session_id: Some(session.id),
            term,
            first_ca: None,
            second_ca: None,
            exam_score: Some(total),
        };
        ScoreService::record_score(&mut self.store, dto)
            .await
            .unwrap();
    }
}
