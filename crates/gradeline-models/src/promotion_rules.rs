//! Promotion rule models.
//!
//! A promotion rule decides whether a student advances at the end of a
//! session. Only one rule is active at a time. The rule kind is stored as
//! TEXT so that a kind this build does not know about still loads and is
//! evaluated as "not eligible".

use crate::ids::PromotionRuleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{
    Database, Decode, Encode, FromRow, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use validator::Validate;

pub const DEFAULT_MIN_AVERAGE: f64 = 50.0;
pub const DEFAULT_MIN_PASSED: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PromotionRuleKind {
    /// Everyone is promoted.
    AllPromote,
    /// Minimum number of A, B and C grades.
    MinimumGrades,
    /// Minimum mean total across subjects.
    MinimumAverage,
    /// Minimum number of subjects graded A, B or C.
    MinimumSubjectsPassed,
    /// A kind this build does not recognise. Never eligible.
    Unrecognized(String),
}

impl PromotionRuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AllPromote => "all_promote",
            Self::MinimumGrades => "minimum_grades",
            Self::MinimumAverage => "minimum_average",
            Self::MinimumSubjectsPassed => "minimum_subjects_passed",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for PromotionRuleKind {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "all_promote" => Self::AllPromote,
            "minimum_grades" => Self::MinimumGrades,
            "minimum_average" => Self::MinimumAverage,
            "minimum_subjects_passed" => Self::MinimumSubjectsPassed,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for PromotionRuleKind {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<PromotionRuleKind> for String {
    fn from(kind: PromotionRuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PromotionRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Type<sqlx::Postgres> for PromotionRuleKind {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for PromotionRuleKind {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for PromotionRuleKind {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::from(raw))
    }
}

impl PgHasArrayType for PromotionRuleKind {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

/// Thresholds used by the rule kinds. Unset fields fall back to the defaults
/// documented on each accessor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PromotionCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_a_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_b_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_c_count: Option<u32>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_passed: Option<u32>,
}

impl PromotionCriteria {
    /// Defaults to 0.
    pub fn min_a_count(&self) -> usize {
        self.min_a_count.unwrap_or(0) as usize
    }

    /// Defaults to 0.
    pub fn min_b_count(&self) -> usize {
        self.min_b_count.unwrap_or(0) as usize
    }

    /// Defaults to 0.
    pub fn min_c_count(&self) -> usize {
        self.min_c_count.unwrap_or(0) as usize
    }

    /// Defaults to [`DEFAULT_MIN_AVERAGE`].
    pub fn min_average(&self) -> f64 {
        self.min_average.unwrap_or(DEFAULT_MIN_AVERAGE)
    }

    /// Defaults to [`DEFAULT_MIN_PASSED`].
    pub fn min_passed(&self) -> usize {
        self.min_passed.unwrap_or(DEFAULT_MIN_PASSED) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromotionRule {
    pub id: PromotionRuleId,
    pub name: String,
    pub description: Option<String>,
    pub kind: PromotionRuleKind,
    pub criteria: Json<PromotionCriteria>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a promotion rule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePromotionRuleDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub kind: PromotionRuleKind,
    #[validate(nested)]
    #[serde(default)]
    pub criteria: PromotionCriteria,
    /// Activate immediately, deactivating every other rule.
    #[serde(default)]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing_fails_closed() {
        assert_eq!(
            PromotionRuleKind::from("minimum_average"),
            PromotionRuleKind::MinimumAverage
        );
        let unknown = PromotionRuleKind::from("lottery");
        assert_eq!(unknown, PromotionRuleKind::Unrecognized("lottery".into()));
        assert!(!unknown.is_recognized());
        assert_eq!(unknown.as_str(), "lottery");
    }

    #[test]
    fn test_kind_serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&PromotionRuleKind::MinimumSubjectsPassed).unwrap();
        assert_eq!(json, "\"minimum_subjects_passed\"");
        let back: PromotionRuleKind = serde_json::from_str("\"all_promote\"").unwrap();
        assert_eq!(back, PromotionRuleKind::AllPromote);
    }

    #[test]
    fn test_criteria_defaults() {
        let criteria: PromotionCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(criteria.min_a_count(), 0);
        assert_eq!(criteria.min_average(), 50.0);
        assert_eq!(criteria.min_passed(), 5);
    }

    #[test]
    fn test_criteria_validation() {
        let ok = PromotionCriteria {
            min_average: Some(45.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_high = PromotionCriteria {
            min_average: Some(120.0),
            ..Default::default()
        };
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn test_negative_counts_are_rejected_when_parsing() {
        let parsed = serde_json::from_str::<PromotionCriteria>(r#"{"min_a_count": -1}"#);
        assert!(parsed.is_err());
    }
}
