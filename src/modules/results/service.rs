use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use gradeline_cache::{RedisCache, keys};
use gradeline_core::AppError;
use gradeline_models::{
    AcademicSession, AcademicSessionId, ClassId, ClassRankings, PromotionStanding, SchoolClass,
    Score, ScoreFilter, SessionAverages, SessionResults, StudentId, StudentResults,
    StudentTermReport, SubjectId, SubjectLine, TermName, TermResults,
};
use gradeline_observability::track_rankings_cache;

use crate::modules::results::ranking::{RankingEngine, score_total};
use crate::modules::results::visibility::ResultVisibility;
use crate::modules::scores::grading::{GradingTable, round2};
use crate::store::{ClassDirectory, ClassHistoryStore, ScoreStore, SessionDirectory, StudentStore};

/// Where ranking results may be cached, and for how long.
#[derive(Clone, Copy)]
pub struct RankingsCache<'a> {
    pub cache: Option<&'a RedisCache>,
    pub ttl: Duration,
}

impl<'a> RankingsCache<'a> {
    pub fn new(cache: Option<&'a RedisCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Always compute.
    pub fn disabled() -> Self {
        Self {
            cache: None,
            ttl: Duration::ZERO,
        }
    }

    async fn get(&self, key: &str) -> Option<ClassRankings> {
        let cache = self.cache?;
        match cache.get::<ClassRankings>(key).await {
            Ok(Some(rankings)) => {
                track_rankings_cache("hit");
                debug!(cache.key = %key, "Rankings cache hit");
                Some(rankings)
            }
            Ok(None) => {
                track_rankings_cache("miss");
                debug!(cache.key = %key, "Rankings cache miss");
                None
            }
            Err(e) => {
                track_rankings_cache("error");
                warn!(error = %e, cache.key = %key, "Rankings cache read failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, rankings: &ClassRankings) {
        let Some(cache) = self.cache else { return };
        if let Err(e) = cache.set_with_ttl(key, rankings, self.ttl).await {
            warn!(error = %e, cache.key = %key, "Rankings cache write failed");
        }
    }
}

pub struct ResultsService;

impl ResultsService {
    /// Subject and overall positions of a `(class, session, term)` cohort.
    #[instrument(skip(store, cache))]
    pub async fn class_rankings<S>(
        store: &mut S,
        cache: RankingsCache<'_>,
        class_id: ClassId,
        session_id: AcademicSessionId,
        term: TermName,
    ) -> Result<ClassRankings, AppError>
    where
        S: ScoreStore + ClassDirectory + SessionDirectory + Send,
    {
        let key = keys::rankings::cohort(class_id, session_id, term);
        if let Some(rankings) = cache.get(&key).await {
            return Ok(rankings);
        }

        if store.find_class(class_id).await?.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }
        if store.find_session(session_id).await?.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Academic session not found"
            )));
        }

        let scores = store
            .query_scores(
                &ScoreFilter::active()
                    .class(class_id)
                    .session(session_id)
                    .term(term),
            )
            .await?;
        let rankings = RankingEngine::class_rankings(class_id, session_id, term, &scores);

        cache.put(&key, &rankings).await;
        Ok(rankings)
    }

    /// Report card data for one student and term.
    ///
    /// The session defaults to the current one. The class shown is the one
    /// the student sat in during that session, so a promoted student's old
    /// reports still show the old class and its positions.
    #[instrument(skip(store, cache))]
    pub async fn student_term_report<S>(
        store: &mut S,
        cache: RankingsCache<'_>,
        student_id: StudentId,
        term: TermName,
        session_id: Option<AcademicSessionId>,
    ) -> Result<StudentTermReport, AppError>
    where
        S: ScoreStore
            + ClassDirectory
            + SessionDirectory
            + StudentStore
            + ClassHistoryStore
            + Send,
    {
        let student = store
            .find_student(student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        let session = resolve_session(store, session_id).await?;
        let class = match class_as_of(store, student_id, &session).await? {
            Some(class) => class,
            None => store
                .find_class(student.class_id)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))?,
        };

        let subject_names: HashMap<SubjectId, String> = store
            .list_subjects()
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let scores = term_scores(store, student_id, session.id, term).await?;
        let rankings = Self::class_rankings(store, cache, class.id, session.id, term).await?;

        let default_table = GradingTable::default_table();
        let mut subjects: Vec<SubjectLine> = scores
            .iter()
            .map(|score| {
                let total_score = score_total(score);
                let derived = total_score.map(|t| default_table.grade(t));
                SubjectLine {
                    subject_id: score.subject_id,
                    subject_name: subject_names
                        .get(&score.subject_id)
                        .cloned()
                        .unwrap_or_default(),
                    first_ca: score.first_ca,
                    second_ca: score.second_ca,
                    exam_score: score.exam_score,
                    total_score,
                    grade: score
                        .grade
                        .clone()
                        .or_else(|| derived.as_ref().map(|m| m.grade.clone())),
                    remark: score
                        .remark
                        .clone()
                        .or_else(|| derived.as_ref().map(|m| m.remark.clone())),
                    position: rankings
                        .subject_position(score.subject_id, student_id)
                        .map(|p| p.label.clone()),
                }
            })
            .collect();
        subjects.sort_by(|a, b| a.subject_name.cmp(&b.subject_name));

        let totals: Vec<f64> = subjects.iter().filter_map(|l| l.total_score).collect();
        let total_score = round2(totals.iter().sum());
        let average_score = average(&totals).unwrap_or(0.0);
        let overall_grade = default_table.grade(average_score).grade;
        let overall_position = rankings
            .overall_position(student_id)
            .map(|p| p.label.clone());

        let (session_averages, promotion_status) = if term == TermName::Third {
            let first = term_average(store, student_id, session.id, TermName::First).await?;
            let second = term_average(store, student_id, session.id, TermName::Second).await?;
            let final_average = first
                .zip(second)
                .map(|(first, second)| round2((first + second + average_score) / 3.0));

            (
                Some(SessionAverages {
                    first_term_average: first,
                    second_term_average: second,
                    third_term_average: average_score,
                    final_average,
                }),
                PromotionStanding::of(&student),
            )
        } else {
            (None, None)
        };

        Ok(StudentTermReport {
            student,
            academic_session: session,
            class,
            term,
            subjects,
            total_score,
            average_score,
            overall_grade,
            overall_position,
            session_averages,
            promotion_status,
        })
    }

    /// Every result the student may see, grouped by session then term.
    ///
    /// Without `session_id`, sessions with no visible scores are left out.
    #[instrument(skip(store))]
    pub async fn student_results<S>(
        store: &mut S,
        student_id: StudentId,
        session_id: Option<AcademicSessionId>,
    ) -> Result<StudentResults, AppError>
    where
        S: ScoreStore
            + ClassDirectory
            + SessionDirectory
            + StudentStore
            + ClassHistoryStore
            + Send,
    {
        let student = store
            .find_student(student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        let all_sessions = store.list_sessions().await?;
        let selected: Vec<&AcademicSession> = match session_id {
            Some(id) => vec![
                all_sessions
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found")))?,
            ],
            None => all_sessions.iter().collect(),
        };

        let visibility = ResultVisibility::for_student(&student, &all_sessions);
        let mut sessions = Vec::new();

        for session in selected {
            let scores = store
                .query_scores(&ScoreFilter::active().student(student_id).session(session.id))
                .await?;

            let terms: Vec<TermResults> = TermName::ALL
                .into_iter()
                .filter(|term| visibility.allows(session, *term))
                .map(|term| TermResults {
                    term,
                    scores: scores.iter().filter(|s| s.term == term).cloned().collect(),
                })
                .filter(|t| !t.scores.is_empty())
                .collect();

            if terms.is_empty() && session_id.is_none() {
                continue;
            }

            let class = class_as_of(store, student_id, session).await?;
            sessions.push(SessionResults {
                academic_session: session.clone(),
                class,
                terms,
            });
        }

        Ok(StudentResults { student, sessions })
    }
}

async fn resolve_session<S>(
    store: &mut S,
    session_id: Option<AcademicSessionId>,
) -> Result<AcademicSession, AppError>
where
    S: SessionDirectory + Send,
{
    match session_id {
        Some(id) => store
            .find_session(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found"))),
        None => store
            .current_session()
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No current academic session"))),
    }
}

/// The class recorded for the student in `session`, if any.
async fn class_as_of<S>(
    store: &mut S,
    student_id: StudentId,
    session: &AcademicSession,
) -> Result<Option<SchoolClass>, AppError>
where
    S: ClassHistoryStore + ClassDirectory + Send,
{
    match store.find_class_history(student_id, session.id).await? {
        Some(history) => store.find_class(history.class_id).await,
        None => Ok(None),
    }
}

async fn term_scores<S>(
    store: &mut S,
    student_id: StudentId,
    session_id: AcademicSessionId,
    term: TermName,
) -> Result<Vec<Score>, AppError>
where
    S: ScoreStore + Send,
{
    store
        .query_scores(
            &ScoreFilter::active()
                .student(student_id)
                .session(session_id)
                .term(term),
        )
        .await
}

async fn term_average<S>(
    store: &mut S,
    student_id: StudentId,
    session_id: AcademicSessionId,
    term: TermName,
) -> Result<Option<f64>, AppError>
where
    S: ScoreStore + Send,
{
    let totals: Vec<f64> = term_scores(store, student_id, session_id, term)
        .await?
        .iter()
        .filter_map(score_total)
        .collect();
    Ok(average(&totals))
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}
