use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use gradeline_cache::{RedisCache, invalidate};
use gradeline_core::AppError;
use gradeline_models::{NewScore, RecordScoreDto, Score};

use crate::modules::scores::grading::{GradingTable, derive_total_and_grade};
use crate::store::{
    ClassDirectory, GradingStore, PgStore, ScoreStore, SessionDirectory, StudentStore,
};

pub struct ScoreService;

impl ScoreService {
    /// Record a score sheet in its own transaction.
    ///
    /// The cohort's cached rankings are dropped once the sheet is committed,
    /// so a concurrent reader cannot cache the rows it replaced.
    #[instrument(skip(db, cache))]
    pub async fn save_score(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: RecordScoreDto,
    ) -> Result<Score, AppError> {
        let mut tx = db.begin().await?;
        let score = Self::record_score(&mut PgStore::new(&mut *tx), dto).await?;
        tx.commit().await?;

        invalidate::cohort_rankings(cache, score.class_id, score.academic_session_id, score.term)
            .await;
        Ok(score)
    }

    /// Record (create or replace) one score sheet.
    ///
    /// The class defaults to the student's current class and the session to
    /// the current session. Total and grade are derived with the class's
    /// grading table. Cached rankings are left alone; see
    /// [`ScoreService::save_score`].
    #[instrument(skip(store))]
    pub async fn record_score<S>(store: &mut S, dto: RecordScoreDto) -> Result<Score, AppError>
    where
        S: SessionDirectory + ScoreStore + ClassDirectory + StudentStore + GradingStore + Send,
    {
        dto.validate().map_err(AppError::invalid_input)?;

        let student = store
            .find_student(dto.student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        if !store
            .list_subjects()
            .await?
            .iter()
            .any(|s| s.id == dto.subject_id)
        {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        let class_id = dto.class_id.unwrap_or(student.class_id);
        if store.find_class(class_id).await?.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }

        let session = match dto.academic_session_id {
            Some(id) => store.find_session(id).await?,
            None => store.current_session().await?,
        }
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found")))?;

        let table = GradingTable::from(store.grading_for_class(class_id).await?);
        let components = dto.components();
        let (total_score, mark) = derive_total_and_grade(&components, &table);
        let (grade, remark) = match mark {
            Some(mark) => (Some(mark.grade), Some(mark.remark)),
            None => (None, None),
        };

        let score = store
            .upsert_score(&NewScore {
                student_id: student.id,
                subject_id: dto.subject_id,
                class_id,
                academic_session_id: session.id,
                term: dto.term,
                components,
                total_score,
                grade,
                remark,
            })
            .await?;

        info!(
            score_id = %score.id,
            student_id = %score.student_id,
            subject_id = %score.subject_id,
            term = %score.term,
            "Score recorded"
        );

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, Utc};
    use gradeline_core::ErrorKind;
    use gradeline_models::{
        AcademicSession, AcademicSessionId, ClassId, GradeBand, GradingConfiguration,
        GradingConfigurationId, SchoolClass, Student, StudentId, StudentStatus, Subject,
        SubjectId, TermName,
    };
    use sqlx::types::Json;

    struct Fixture {
        store: MemoryStore,
        student: StudentId,
        subject: SubjectId,
        class: ClassId,
        session: AcademicSessionId,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let class = SchoolClass {
            id: ClassId::new(),
            name: "JSS 1".into(),
            form_teacher_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let subject = Subject {
            id: SubjectId::new(),
            name: "Mathematics".into(),
            code: Some("MTH".into()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let session = AcademicSession {
            id: AcademicSessionId::new(),
            name: "2024/2025".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            is_current: true,
            is_manual: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let student = Student {
            id: StudentId::new(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            admission_number: None,
            class_id: class.id,
            admission_academic_session_id: None,
            admission_term: None,
            status: StudentStatus::Active,
            promoted_this_session: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        Fixture {
            student: student.id,
            subject: subject.id,
            class: class.id,
            session: session.id,
            store: MemoryStore {
                classes: vec![class],
                subjects: vec![subject],
                sessions: vec![session],
                students: vec![student],
                ..MemoryStore::default()
            },
        }
    }

    fn dto(fx: &Fixture, first_ca: Option<f64>, exam: Option<f64>) -> RecordScoreDto {
        RecordScoreDto {
            student_id: fx.student,
            subject_id: fx.subject,
            class_id: None,
            academic_session_id: None,
            term: TermName::First,
            first_ca,
            second_ca: None,
            exam_score: exam,
        }
    }

    #[tokio::test]
    async fn test_record_defaults_class_and_session() {
        let mut fx = fixture();
        let d = dto(&fx, Some(18.0), Some(55.0));

        let score = ScoreService::record_score(&mut fx.store, d).await.unwrap();

        assert_eq!(score.class_id, fx.class);
        assert_eq!(score.academic_session_id, fx.session);
        assert_eq!(score.total_score, Some(73.0));
        assert_eq!(score.grade.as_deref(), Some("B"));
        assert_eq!(score.remark.as_deref(), Some("Very Good"));
    }

    #[tokio::test]
    async fn test_record_replaces_existing_sheet() {
        let mut fx = fixture();
        let first = dto(&fx, Some(10.0), None);
        let second = dto(&fx, Some(10.0), Some(75.0));

        ScoreService::record_score(&mut fx.store, first).await.unwrap();
        let score = ScoreService::record_score(&mut fx.store, second).await.unwrap();

        assert_eq!(fx.store.scores.len(), 1);
        assert_eq!(score.total_score, Some(85.0));
        assert_eq!(score.grade.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_record_uses_class_grading_table() {
        let mut fx = fixture();
        let now = Utc::now();
        fx.store.grading.push(GradingConfiguration {
            id: GradingConfigurationId::new(),
            name: "Junior secondary".into(),
            description: None,
            class_ids: vec![fx.class],
            bands: Json(vec![GradeBand::new("P", 0.0, 100.0, "Pass")]),
            is_active: true,
            is_default: false,
            created_at: now,
            updated_at: now,
        });

        let d = dto(&fx, Some(5.0), Some(20.0));
        let score = ScoreService::record_score(&mut fx.store, d).await.unwrap();
        assert_eq!(score.grade.as_deref(), Some("P"));
    }

    #[tokio::test]
    async fn test_record_without_components_stores_no_total() {
        let mut fx = fixture();
        let d = dto(&fx, None, None);

        let score = ScoreService::record_score(&mut fx.store, d).await.unwrap();
        assert!(score.total_score.is_none());
        assert!(score.grade.is_none());
    }

    #[tokio::test]
    async fn test_record_rejects_out_of_range_marks() {
        let mut fx = fixture();
        let d = dto(&fx, Some(-2.0), None);

        let err = ScoreService::record_score(&mut fx.store, d).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert!(fx.store.scores.is_empty());
    }

    #[tokio::test]
    async fn test_record_without_current_session_is_not_found() {
        let mut fx = fixture();
        fx.store.sessions[0].is_current = false;
        let d = dto(&fx, Some(10.0), None);

        let err = ScoreService::record_score(&mut fx.store, d).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
