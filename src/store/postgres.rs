use sqlx::PgConnection;

use gradeline_core::AppError;
use gradeline_models::{
    AcademicSession, AcademicSessionId, ClassId, CreatePromotionRuleDto, CurrentFlags,
    GradingConfiguration, NewAcademicSession, NewScore, PromotionRule, PromotionRuleId,
    SchoolClass, Score, ScoreFilter, Student, StudentClassHistory, StudentFilter, StudentId,
    StudentPatch, StudentStatus, Subject, Term, TermId, TermWindow,
};
use sqlx::types::Json;

use super::{
    ClassDirectory, ClassHistoryStore, GradingStore, PromotionRuleStore, ScoreStore,
    SessionDirectory, StudentStore,
};

const SESSION_COLUMNS: &str =
    "id, name, start_date, end_date, is_current, is_manual, is_active, created_at, updated_at";

const TERM_COLUMNS: &str = "id, academic_session_id, name, display_name, start_date, end_date, \
     is_current, is_manual, is_active, created_at, updated_at";

const SCORE_COLUMNS: &str = "id, student_id, subject_id, class_id, academic_session_id, term, \
     first_ca, second_ca, exam_score, total_score, grade, remark, is_active, created_at, updated_at";

const STUDENT_COLUMNS: &str = "id, first_name, last_name, admission_number, class_id, \
     admission_academic_session_id, admission_term, status, promoted_this_session, is_active, \
     created_at, updated_at";

const RULE_COLUMNS: &str =
    "id, name, description, kind, criteria, is_active, created_at, updated_at";

/// Postgres-backed store over a single connection, usually a transaction.
///
/// ```ignore
/// let mut tx = db.begin().await?;
/// let summary = {
///     let mut store = PgStore::new(&mut tx);
///     PromotionOrchestrator::run(&mut store, &dto).await?
/// };
/// tx.commit().await?;
/// ```
pub struct PgStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

fn unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl SessionDirectory for PgStore<'_> {
    async fn list_sessions(&mut self) -> Result<Vec<AcademicSession>, AppError> {
        let sessions = sqlx::query_as::<_, AcademicSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM academic_sessions ORDER BY start_date, id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(sessions)
    }

    async fn find_session(
        &mut self,
        id: AcademicSessionId,
    ) -> Result<Option<AcademicSession>, AppError> {
        let session = sqlx::query_as::<_, AcademicSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM academic_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(session)
    }

    async fn list_all_terms(&mut self) -> Result<Vec<Term>, AppError> {
        let terms = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms ORDER BY start_date, id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(terms)
    }

    async fn list_terms_for(&mut self, session_id: AcademicSessionId) -> Result<Vec<Term>, AppError> {
        let terms = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE academic_session_id = $1 ORDER BY name"
        ))
        .bind(session_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(terms)
    }

    async fn current_session(&mut self) -> Result<Option<AcademicSession>, AppError> {
        let session = sqlx::query_as::<_, AcademicSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM academic_sessions
             WHERE is_current = TRUE AND is_active = TRUE
             ORDER BY start_date DESC
             LIMIT 1"
        ))
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(session)
    }

    async fn current_term(&mut self) -> Result<Option<Term>, AppError> {
        let term = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms
             WHERE is_current = TRUE AND is_active = TRUE
             ORDER BY start_date DESC
             LIMIT 1"
        ))
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(term)
    }

    async fn update_session_flags(
        &mut self,
        id: AcademicSessionId,
        flags: CurrentFlags,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE academic_sessions
             SET is_current = $2, is_manual = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(flags.is_current)
        .bind(flags.is_manual)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn update_term_flags(&mut self, id: TermId, flags: CurrentFlags) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE terms
             SET is_current = $2, is_manual = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(flags.is_current)
        .bind(flags.is_manual)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn set_current_session(&mut self, id: AcademicSessionId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM academic_sessions WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *self.conn)
                .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Academic session not found"
            )));
        }

        sqlx::query(
            "UPDATE academic_sessions
             SET is_current = FALSE, is_manual = FALSE, updated_at = NOW()
             WHERE id <> $1 AND (is_current OR is_manual)",
        )
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        self.update_session_flags(id, CurrentFlags::new(true, true))
            .await
    }

    async fn set_current_term(&mut self, id: TermId) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM terms WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("Term not found")));
        }

        sqlx::query(
            "UPDATE terms
             SET is_current = FALSE, is_manual = FALSE, updated_at = NOW()
             WHERE id <> $1 AND (is_current OR is_manual)",
        )
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        self.update_term_flags(id, CurrentFlags::new(true, true)).await
    }

    async fn insert_session(
        &mut self,
        session: &NewAcademicSession,
    ) -> Result<AcademicSession, AppError> {
        sqlx::query_as::<_, AcademicSession>(&format!(
            "INSERT INTO academic_sessions (name, start_date, end_date, is_current, is_manual)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(&session.name)
        .bind(session.start_date)
        .bind(session.end_date)
        .bind(session.is_current)
        .bind(session.is_manual)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if unique_violation(&e) {
                return AppError::conflict(anyhow::anyhow!(
                    "An academic session named '{}' already exists",
                    session.name
                ));
            }
            AppError::from(e)
        })
    }

    async fn insert_term(
        &mut self,
        session_id: AcademicSessionId,
        window: &TermWindow,
    ) -> Result<Term, AppError> {
        let term = sqlx::query_as::<_, Term>(&format!(
            "INSERT INTO terms (academic_session_id, name, display_name, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TERM_COLUMNS}"
        ))
        .bind(session_id)
        .bind(window.name)
        .bind(window.name.display_name())
        .bind(window.start_date)
        .bind(window.end_date)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(term)
    }

    async fn delete_session(&mut self, id: AcademicSessionId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM academic_sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ScoreStore for PgStore<'_> {
    async fn query_scores(&mut self, filter: &ScoreFilter) -> Result<Vec<Score>, AppError> {
        let scores = sqlx::query_as::<_, Score>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores
             WHERE ($1::uuid IS NULL OR student_id = $1)
               AND ($2::uuid IS NULL OR class_id = $2)
               AND ($3::uuid IS NULL OR subject_id = $3)
               AND ($4::uuid IS NULL OR academic_session_id = $4)
               AND ($5::term_name IS NULL OR term = $5)
               AND ($6::boolean IS NULL OR is_active = $6)
             ORDER BY term, created_at, id"
        ))
        .bind(filter.student_id)
        .bind(filter.class_id)
        .bind(filter.subject_id)
        .bind(filter.academic_session_id)
        .bind(filter.term)
        .bind(filter.is_active)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(scores)
    }

    async fn upsert_score(&mut self, score: &NewScore) -> Result<Score, AppError> {
        let saved = sqlx::query_as::<_, Score>(&format!(
            "INSERT INTO scores (
                student_id, subject_id, class_id, academic_session_id, term,
                first_ca, second_ca, exam_score, total_score, grade, remark
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT ON CONSTRAINT scores_unique DO UPDATE SET
                first_ca = EXCLUDED.first_ca,
                second_ca = EXCLUDED.second_ca,
                exam_score = EXCLUDED.exam_score,
                total_score = EXCLUDED.total_score,
                grade = EXCLUDED.grade,
                remark = EXCLUDED.remark,
                is_active = TRUE,
                updated_at = NOW()
             RETURNING {SCORE_COLUMNS}"
        ))
        .bind(score.student_id)
        .bind(score.subject_id)
        .bind(score.class_id)
        .bind(score.academic_session_id)
        .bind(score.term)
        .bind(score.components.first_ca)
        .bind(score.components.second_ca)
        .bind(score.components.exam_score)
        .bind(score.total_score)
        .bind(&score.grade)
        .bind(&score.remark)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(saved)
    }

    async fn count_session_scores(&mut self, session_id: AcademicSessionId) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM scores WHERE academic_session_id = $1",
        )
        .bind(session_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }
}

impl ClassDirectory for PgStore<'_> {
    async fn list_active_classes(&mut self) -> Result<Vec<SchoolClass>, AppError> {
        let classes = sqlx::query_as::<_, SchoolClass>(
            "SELECT id, name, form_teacher_id, is_active, created_at, updated_at
             FROM classes
             WHERE is_active = TRUE
             ORDER BY name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(classes)
    }

    async fn find_class(&mut self, id: ClassId) -> Result<Option<SchoolClass>, AppError> {
        let class = sqlx::query_as::<_, SchoolClass>(
            "SELECT id, name, form_teacher_id, is_active, created_at, updated_at
             FROM classes
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(class)
    }

    async fn find_class_by_name(&mut self, name: &str) -> Result<Option<SchoolClass>, AppError> {
        let class = sqlx::query_as::<_, SchoolClass>(
            "SELECT id, name, form_teacher_id, is_active, created_at, updated_at
             FROM classes
             WHERE is_active = TRUE AND LOWER(TRIM(name)) = LOWER(TRIM($1))
             ORDER BY name
             LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(class)
    }

    async fn list_subjects(&mut self) -> Result<Vec<Subject>, AppError> {
        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT id, name, code, is_active, created_at, updated_at
             FROM subjects
             ORDER BY name",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(subjects)
    }
}

impl StudentStore for PgStore<'_> {
    async fn list_active_students(&mut self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE is_active = TRUE
               AND status <> $1
               AND ($2::uuid IS NULL OR class_id = $2)
             ORDER BY last_name, first_name, id"
        ))
        .bind(StudentStatus::Graduated)
        .bind(filter.class_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(students)
    }

    async fn find_student(&mut self, id: StudentId) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(student)
    }

    async fn update_student(&mut self, id: StudentId, patch: &StudentPatch) -> Result<(), AppError> {
        if patch.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE students
             SET class_id = COALESCE($2, class_id),
                 status = COALESCE($3, status),
                 promoted_this_session = COALESCE($4, promoted_this_session),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.class_id)
        .bind(patch.status)
        .bind(patch.promoted_this_session)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }
}

impl ClassHistoryStore for PgStore<'_> {
    async fn upsert_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
        class_id: ClassId,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO student_class_history (student_id, academic_session_id, class_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT student_class_history_unique
             DO UPDATE SET class_id = EXCLUDED.class_id, updated_at = NOW()",
        )
        .bind(student_id)
        .bind(session_id)
        .bind(class_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn find_class_history(
        &mut self,
        student_id: StudentId,
        session_id: AcademicSessionId,
    ) -> Result<Option<StudentClassHistory>, AppError> {
        let history = sqlx::query_as::<_, StudentClassHistory>(
            "SELECT id, student_id, academic_session_id, class_id, created_at, updated_at
             FROM student_class_history
             WHERE student_id = $1 AND academic_session_id = $2",
        )
        .bind(student_id)
        .bind(session_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(history)
    }
}

impl PromotionRuleStore for PgStore<'_> {
    async fn get_active_rule(&mut self) -> Result<Option<PromotionRule>, AppError> {
        let rule = sqlx::query_as::<_, PromotionRule>(&format!(
            "SELECT {RULE_COLUMNS} FROM promotion_rules WHERE is_active = TRUE LIMIT 1"
        ))
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(rule)
    }

    async fn insert_rule(&mut self, dto: &CreatePromotionRuleDto) -> Result<PromotionRule, AppError> {
        let rule = sqlx::query_as::<_, PromotionRule>(&format!(
            "INSERT INTO promotion_rules (name, description, kind, criteria)
             VALUES ($1, $2, $3, $4)
             RETURNING {RULE_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.kind)
        .bind(Json(&dto.criteria))
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(rule)
    }

    async fn activate_rule(&mut self, id: PromotionRuleId) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM promotion_rules WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *self.conn)
                .await?;

        if !exists {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE promotion_rules SET is_active = FALSE, updated_at = NOW()
             WHERE is_active = TRUE AND id <> $1",
        )
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        sqlx::query("UPDATE promotion_rules SET is_active = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(true)
    }
}

impl GradingStore for PgStore<'_> {
    async fn grading_for_class(
        &mut self,
        class_id: ClassId,
    ) -> Result<Option<GradingConfiguration>, AppError> {
        let config = sqlx::query_as::<_, GradingConfiguration>(
            "SELECT id, name, description, class_ids, bands, is_active, is_default,
                    created_at, updated_at
             FROM grading_configurations
             WHERE is_active = TRUE AND ($1 = ANY(class_ids) OR is_default = TRUE)
             ORDER BY ($1 = ANY(class_ids)) DESC, updated_at DESC
             LIMIT 1",
        )
        .bind(class_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(config)
    }
}
