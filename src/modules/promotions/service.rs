use sqlx::PgPool;
use tracing::{error, info, instrument};
use validator::Validate;

use gradeline_cache::{RedisCache, invalidate};
use gradeline_core::AppError;
use gradeline_models::{
    CreatePromotionRuleDto, PromotionRule, PromotionRuleId, PromotionSummary, RunPromotionDto,
};
use gradeline_observability::track_promotion_run;

use crate::modules::promotions::orchestrator::PromotionOrchestrator;
use crate::store::{PgStore, PromotionRuleStore};

pub struct PromotionService;

impl PromotionService {
    /// Run a promotion pass in a single transaction.
    ///
    /// Either every student's outcome is committed or, on any error, none is.
    /// Rankings cached for the session are dropped after a successful run.
    #[instrument(skip(db, cache))]
    pub async fn run_promotion(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: RunPromotionDto,
    ) -> Result<PromotionSummary, AppError> {
        let mut tx = db.begin().await?;

        let outcome = {
            let mut store = PgStore::new(&mut *tx);
            PromotionOrchestrator::run(&mut store, &dto).await
        };

        match outcome {
            Ok(summary) => {
                tx.commit().await?;
                track_promotion_run("committed");
                invalidate::session_rankings(cache, dto.academic_session_id).await;
                Ok(summary)
            }
            Err(e) => {
                // Dropping the transaction rolls it back.
                drop(tx);
                track_promotion_run("failed");
                error!(error = %e, "Promotion run rolled back");
                Err(e)
            }
        }
    }

    /// Create a rule, activating it (and deactivating the others) when asked.
    #[instrument(skip(store))]
    pub async fn create_rule<S>(
        store: &mut S,
        dto: CreatePromotionRuleDto,
    ) -> Result<PromotionRule, AppError>
    where
        S: PromotionRuleStore + Send,
    {
        dto.validate().map_err(AppError::invalid_input)?;

        let mut rule = store.insert_rule(&dto).await?;
        if dto.is_active {
            store.activate_rule(rule.id).await?;
            rule.is_active = true;
        }

        info!(rule_id = %rule.id, kind = %rule.kind, active = rule.is_active, "Promotion rule created");
        Ok(rule)
    }

    #[instrument(skip(store))]
    pub async fn activate_rule<S>(store: &mut S, id: PromotionRuleId) -> Result<(), AppError>
    where
        S: PromotionRuleStore + Send,
    {
        if !store.activate_rule(id).await? {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Promotion rule not found"
            )));
        }

        info!(rule_id = %id, "Promotion rule activated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use gradeline_core::ErrorKind;
    use gradeline_models::{PromotionCriteria, PromotionRuleKind};

    fn dto(name: &str, kind: &str, is_active: bool) -> CreatePromotionRuleDto {
        CreatePromotionRuleDto {
            name: name.to_string(),
            description: None,
            kind: PromotionRuleKind::from(kind),
            criteria: PromotionCriteria::default(),
            is_active,
        }
    }

    #[tokio::test]
    async fn test_create_active_rule_replaces_previous() {
        let mut store = MemoryStore::new();

        let first = PromotionService::create_rule(&mut store, dto("Everyone", "all_promote", true))
            .await
            .unwrap();
        let second =
            PromotionService::create_rule(&mut store, dto("Average", "minimum_average", true))
                .await
                .unwrap();

        let active = store.get_active_rule().await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert!(store.rules.iter().any(|r| r.id == first.id && !r.is_active));
    }

    #[tokio::test]
    async fn test_create_inactive_rule_keeps_current() {
        let mut store = MemoryStore::new();
        let current = PromotionService::create_rule(&mut store, dto("Everyone", "all_promote", true))
            .await
            .unwrap();
        PromotionService::create_rule(&mut store, dto("Draft", "minimum_grades", false))
            .await
            .unwrap();

        assert_eq!(store.get_active_rule().await.unwrap().unwrap().id, current.id);
    }

    #[tokio::test]
    async fn test_create_rule_validates_criteria() {
        let mut store = MemoryStore::new();
        let mut bad = dto("Strict", "minimum_average", true);
        bad.criteria.min_average = Some(101.0);

        let err = PromotionService::create_rule(&mut store, bad).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert!(store.rules.is_empty());

        let err = PromotionService::create_rule(&mut store, dto("", "all_promote", false))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_activate_missing_rule() {
        let mut store = MemoryStore::new();
        let err = PromotionService::activate_rule(&mut store, PromotionRuleId::new())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_activate_switches_rule() {
        let mut store = MemoryStore::new();
        let a = PromotionService::create_rule(&mut store, dto("A", "all_promote", true))
            .await
            .unwrap();
        let b = PromotionService::create_rule(&mut store, dto("B", "minimum_average", false))
            .await
            .unwrap();

        PromotionService::activate_rule(&mut store, b.id).await.unwrap();
        assert_eq!(store.get_active_rule().await.unwrap().unwrap().id, b.id);

        PromotionService::activate_rule(&mut store, a.id).await.unwrap();
        assert_eq!(store.get_active_rule().await.unwrap().unwrap().id, a.id);
    }
}
