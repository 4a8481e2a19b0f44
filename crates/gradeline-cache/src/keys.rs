//! Cache keys and invalidation helpers.
//!
//! Keys here are relative; [`RedisCache`] adds the configured prefix, so with
//! the default prefix a cohort ranking lives at
//! `gradeline:rankings:{class}:{session}:{term}`.

use crate::RedisCache;
use gradeline_models::{AcademicSessionId, ClassId, TermName};
use tracing::warn;

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Keys for class rankings.
pub mod rankings {
    use super::*;

    /// Rankings of one `(class, session, term)` cohort.
    pub fn cohort(class_id: ClassId, session_id: AcademicSessionId, term: TermName) -> String {
        build_key(&[
            "rankings",
            &class_id.to_string(),
            &session_id.to_string(),
            term.as_str(),
        ])
    }

    /// Every cached cohort of a session, whatever the class or term.
    pub fn session_pattern(session_id: AcademicSessionId) -> String {
        format!("rankings:*:{}:*", session_id)
    }
}

/// Invalidation helpers. Failures are logged and swallowed: a stale ranking
/// expires with its TTL, and a cache outage must not fail a score write.
pub mod invalidate {
    use super::*;

    /// Call after any score of the cohort changes.
    pub async fn cohort_rankings(
        cache: Option<&RedisCache>,
        class_id: ClassId,
        session_id: AcademicSessionId,
        term: TermName,
    ) {
        let Some(cache) = cache else { return };

        if let Err(e) = cache
            .invalidate(&rankings::cohort(class_id, session_id, term))
            .await
        {
            warn!(error = %e, class_id = %class_id, session_id = %session_id, term = %term, "Failed to invalidate rankings cache");
        }
    }

    /// Call after a session is deleted or its scores are rewritten in bulk.
    pub async fn session_rankings(cache: Option<&RedisCache>, session_id: AcademicSessionId) {
        let Some(cache) = cache else { return };

        if let Err(e) = cache
            .invalidate_pattern(&rankings::session_pattern(session_id))
            .await
        {
            warn!(error = %e, session_id = %session_id, "Failed to invalidate session rankings cache");
        }
    }
}
