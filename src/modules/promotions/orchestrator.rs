//! End-of-session promotion pass.
//!
//! The orchestrator only talks to the store traits; it never commits.
//! [`PromotionService::run_promotion`](super::PromotionService::run_promotion)
//! wraps a run in one transaction so a failure leaves every student as it was.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use gradeline_core::AppError;
use gradeline_models::{
    AcademicSessionId, ClassId, PromotionOutcome, PromotionSummary, RunPromotionDto, Score,
    ScoreFilter, Student, StudentFilter, StudentPatch, StudentPromotion, StudentStatus, SubjectId,
};
use gradeline_observability::track_promotion;

use crate::modules::promotions::progression::{ClassProgressionResolver, Progression};
use crate::modules::promotions::rules::{PromotionRuleEvaluator, SubjectResult};
use crate::modules::scores::grading::{GradingTable, derive_total_and_grade};
use crate::store::SchoolStore;

/// Terms a session needs before it can be promoted.
const TERMS_PER_SESSION: usize = 3;

pub struct PromotionOrchestrator;

impl PromotionOrchestrator {
    /// Promote, repeat or graduate every enrolled student in scope.
    ///
    /// Fails before writing anything when the session or class filter does
    /// not exist, when no rule is active, or when the session does not have
    /// all three terms.
    #[instrument(skip(store))]
    pub async fn run<S: SchoolStore>(
        store: &mut S,
        dto: &RunPromotionDto,
    ) -> Result<PromotionSummary, AppError> {
        let session = store
            .find_session(dto.academic_session_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic session not found")))?;

        let rule = store.get_active_rule().await?.ok_or_else(|| {
            AppError::configuration(anyhow::anyhow!("No active promotion rule found"))
        })?;

        let terms = store.list_terms_for(session.id).await?;
        if terms.len() != TERMS_PER_SESSION {
            return Err(AppError::configuration(anyhow::anyhow!(
                "Academic session '{}' has {} terms; promotion needs {}",
                session.name,
                terms.len(),
                TERMS_PER_SESSION
            )));
        }

        if let Some(class_id) = dto.class_id {
            if store.find_class(class_id).await?.is_none() {
                return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
            }
        }

        let classes = store.list_active_classes().await?;
        let students = store
            .list_active_students(&StudentFilter {
                class_id: dto.class_id,
            })
            .await?;

        info!(
            session = %session.name,
            rule = %rule.name,
            kind = %rule.kind,
            students = students.len(),
            "Starting promotion run"
        );

        let mut summary = PromotionSummary::default();

        for student in students {
            store
                .upsert_class_history(student.id, session.id, student.class_id)
                .await?;

            let results = best_results(store, &student, session.id).await?;
            if results.is_empty() {
                debug!(student_id = %student.id, "No results this session, skipping");
                summary.record(StudentPromotion {
                    student_id: student.id,
                    outcome: PromotionOutcome::Skipped,
                    from_class_id: student.class_id,
                    to_class_id: student.class_id,
                });
                track_promotion(PromotionOutcome::Skipped.as_str());
                continue;
            }

            let class_name = match classes.iter().find(|c| c.id == student.class_id) {
                Some(class) => class.name.clone(),
                None => store
                    .find_class(student.class_id)
                    .await?
                    .map(|c| c.name)
                    .unwrap_or_default(),
            };

            let progression = ClassProgressionResolver::resolve(&class_name, &classes);
            let (outcome, to_class_id) = match progression {
                Progression::Graduating => (PromotionOutcome::Graduated, student.class_id),
                _ if PromotionRuleEvaluator::evaluate(&rule, &results) => {
                    match progression {
                        Progression::AdvanceTo(next) => (PromotionOutcome::Promoted, next.id),
                        _ => (PromotionOutcome::Graduated, student.class_id),
                    }
                }
                _ => (PromotionOutcome::Repeated, student.class_id),
            };

            store
                .update_student(student.id, &patch_for(outcome, to_class_id))
                .await?;

            info!(
                student_id = %student.id,
                class = %class_name,
                outcome = %outcome,
                "Promotion decided"
            );
            track_promotion(outcome.as_str());

            summary.record(StudentPromotion {
                student_id: student.id,
                outcome,
                from_class_id: student.class_id,
                to_class_id,
            });
        }

        info!(
            promoted = summary.promoted,
            repeated = summary.repeated,
            graduated = summary.graduated,
            skipped = summary.skipped,
            total = summary.total,
            "Promotion run finished"
        );

        Ok(summary)
    }
}

fn patch_for(outcome: PromotionOutcome, to_class_id: ClassId) -> StudentPatch {
    match outcome {
        PromotionOutcome::Promoted => StudentPatch {
            class_id: Some(to_class_id),
            status: Some(StudentStatus::Active),
            promoted_this_session: Some(true),
        },
        PromotionOutcome::Graduated => StudentPatch {
            status: Some(StudentStatus::Graduated),
            promoted_this_session: Some(false),
            ..StudentPatch::default()
        },
        PromotionOutcome::Repeated => StudentPatch {
            status: Some(StudentStatus::Repeated),
            promoted_this_session: Some(false),
            ..StudentPatch::default()
        },
        PromotionOutcome::Skipped => StudentPatch::default(),
    }
}

/// Best result per subject across the session's terms.
///
/// Rows without a stored total or grade are graded on the fly with the
/// built-in table; nothing is written back. On equal totals the earliest
/// row (by term) is kept.
async fn best_results<S: SchoolStore>(
    store: &mut S,
    student: &Student,
    session_id: AcademicSessionId,
) -> Result<Vec<SubjectResult>, AppError> {
    let scores = store
        .query_scores(&ScoreFilter::active().student(student.id).session(session_id))
        .await?;

    let table = GradingTable::default_table();
    let mut best: BTreeMap<SubjectId, SubjectResult> = BTreeMap::new();

    for score in &scores {
        let candidate = subject_result(score, &table);
        match best.get(&score.subject_id) {
            Some(current) if current.total_score >= candidate.total_score => {}
            _ => {
                best.insert(score.subject_id, candidate);
            }
        }
    }

    Ok(best.into_values().collect())
}

fn subject_result(score: &Score, table: &GradingTable) -> SubjectResult {
    let (derived_total, derived_mark) = derive_total_and_grade(&score.components(), table);
    let total_score = score.total_score.or(derived_total).unwrap_or(0.0);

    let grade = match score.grade.as_deref().map(str::trim) {
        Some(grade) if !grade.is_empty() => grade.to_string(),
        _ => match score.total_score {
            Some(total) => table.grade(total).grade,
            None => derived_mark.map(|m| m.grade).unwrap_or_else(|| table.grade(0.0).grade),
        },
    };

    SubjectResult {
        subject_id: score.subject_id,
        total_score,
        grade,
    }
}
