use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use gradeline_cache::{RedisCache, invalidate};
use gradeline_core::AppError;
use gradeline_models::{
    AcademicSession, AcademicSessionId, CreateAcademicSessionDto, CurrentPeriod,
    NewAcademicSession, SessionOverview, Term, TermId, WithStatus,
};

use crate::modules::academic_sessions::schedule::term_windows;
use crate::modules::academic_sessions::state_machine::TermStateMachine;
use crate::store::{PgStore, ScoreStore, SessionDirectory};

pub struct AcademicSessionService;

impl AcademicSessionService {
    /// Create a session and its three terms.
    ///
    /// Validates that:
    /// - the name is 1-100 characters and not already taken
    /// - start_date < end_date and the dates fit the term calendar
    /// - the window does not overlap an existing session
    ///
    /// Run inside a transaction so a failed term insert leaves no session behind.
    #[instrument(skip(store))]
    pub async fn create_academic_session<S>(
        store: &mut S,
        dto: CreateAcademicSessionDto,
        today: NaiveDate,
    ) -> Result<SessionOverview, AppError>
    where
        S: SessionDirectory + Send,
    {
        dto.validate().map_err(AppError::invalid_input)?;

        if dto.start_date >= dto.end_date {
            return Err(AppError::validation(anyhow::anyhow!(
                "Start date must be before end date"
            )));
        }

        let windows = term_windows(dto.start_date, dto.end_date).ok_or_else(|| {
            AppError::validation(anyhow::anyhow!(
                "A session must run from one calendar year into the next and end on or after 1 May"
            ))
        })?;

        let existing = store.list_sessions().await?;
        if existing.iter().any(|s| s.name == dto.name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "An academic session named '{}' already exists",
                dto.name
            )));
        }
        if let Some(clash) = existing
            .iter()
            .find(|s| s.overlaps(dto.start_date, dto.end_date))
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Date conflict with existing session: {}",
                clash.name
            )));
        }

        if dto.is_current {
            for session in existing.iter().filter(|s| s.is_current || s.is_manual) {
                store
                    .update_session_flags(session.id, Default::default())
                    .await?;
            }
        }

        let session = store
            .insert_session(&NewAcademicSession {
                name: dto.name,
                start_date: dto.start_date,
                end_date: dto.end_date,
                is_current: dto.is_current,
                is_manual: dto.is_current,
            })
            .await?;

        let mut terms = Vec::with_capacity(windows.len());
        for window in &windows {
            terms.push(store.insert_term(session.id, window).await?);
        }

        info!(session_id = %session.id, name = %session.name, "Academic session created");

        Ok(overview(session, terms, today))
    }

    /// Delete a session in its own transaction, dropping its cached rankings
    /// after the commit.
    #[instrument(skip(db, cache))]
    pub async fn remove_academic_session(
        db: &PgPool,
        cache: Option<&RedisCache>,
        session_id: AcademicSessionId,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        Self::delete_academic_session(&mut PgStore::new(&mut *tx), session_id).await?;
        tx.commit().await?;

        invalidate::session_rankings(cache, session_id).await;
        Ok(())
    }

    /// Delete a session. Refused while any score references it.
    #[instrument(skip(store))]
    pub async fn delete_academic_session<S>(
        store: &mut S,
        session_id: AcademicSessionId,
    ) -> Result<(), AppError>
    where
        S: SessionDirectory + ScoreStore + Send,
    {
        let session = store
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found")))?;

        let score_count = store.count_session_scores(session_id).await?;
        if score_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete academic session '{}' with {} associated scores; deactivate it instead",
                session.name,
                score_count
            )));
        }

        if !store.delete_session(session_id).await? {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Academic session not found"
            )));
        }

        info!(session_id = %session_id, "Academic session deleted");

        Ok(())
    }

    /// Every session with its terms and derived statuses, oldest first.
    #[instrument(skip(store))]
    pub async fn list_sessions_with_status<S>(
        store: &mut S,
        today: NaiveDate,
    ) -> Result<Vec<SessionOverview>, AppError>
    where
        S: SessionDirectory + Send,
    {
        let sessions = store.list_sessions().await?;
        let mut overviews = Vec::with_capacity(sessions.len());

        for session in sessions {
            let terms = store.list_terms_for(session.id).await?;
            overviews.push(overview(session, terms, today));
        }

        Ok(overviews)
    }

    /// Bring the current flags in line with `today`, then read them back.
    #[instrument(skip(store))]
    pub async fn current_period<S>(store: &mut S, today: NaiveDate) -> Result<CurrentPeriod, AppError>
    where
        S: SessionDirectory + Send,
    {
        TermStateMachine::run(store, today).await?;

        let session = store.current_session().await?.map(|session| WithStatus {
            status: session.status(today),
            item: session,
        });
        let term = store.current_term().await?.map(|term| WithStatus {
            status: term.status(today),
            item: term,
        });

        Ok(CurrentPeriod { session, term })
    }

    /// Pin a session as current, exempting it from automatic transitions.
    #[instrument(skip(store))]
    pub async fn set_current_session<S>(
        store: &mut S,
        session_id: AcademicSessionId,
    ) -> Result<AcademicSession, AppError>
    where
        S: SessionDirectory + Send,
    {
        store.set_current_session(session_id).await?;

        let session = store
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found")))?;

        info!(session_id = %session.id, name = %session.name, "Academic session pinned as current");
        Ok(session)
    }

    /// Pin a term of `session_id` as current.
    #[instrument(skip(store))]
    pub async fn set_current_term<S>(
        store: &mut S,
        session_id: AcademicSessionId,
        term_id: TermId,
    ) -> Result<Term, AppError>
    where
        S: SessionDirectory + Send,
    {
        if store.find_session(session_id).await?.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Academic session not found"
            )));
        }

        let terms = store.list_terms_for(session_id).await?;
        let Some(term) = terms.into_iter().find(|t| t.id == term_id) else {
            return Err(AppError::validation(anyhow::anyhow!(
                "Term does not belong to the specified academic session"
            )));
        };

        store.set_current_term(term.id).await?;
        info!(term_id = %term.id, term = %term.name, "Term pinned as current");

        Ok(Term {
            is_current: true,
            is_manual: true,
            ..term
        })
    }
}

fn overview(session: AcademicSession, terms: Vec<Term>, today: NaiveDate) -> SessionOverview {
    let terms = terms
        .into_iter()
        .map(|term| WithStatus {
            status: term.status(today),
            item: term,
        })
        .collect();

    SessionOverview {
        status: session.status(today),
        session,
        terms,
    }
}
