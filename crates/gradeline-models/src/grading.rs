//! Grading table models.
//!
//! A grading table is an ordered list of [`GradeBand`]s. Schools may attach a
//! table to specific classes through a [`GradingConfiguration`]; everything
//! else falls back to the default configuration or the built-in table.

use crate::ids::{ClassId, GradingConfigurationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// One row of a grading table: scores in `[min, max]` earn `grade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub grade: String,
    pub min: f64,
    pub max: f64,
    pub remark: String,
}

impl GradeBand {
    pub fn new(grade: &str, min: f64, max: f64, remark: &str) -> Self {
        Self {
            grade: grade.to_string(),
            min,
            max,
            remark: remark.to_string(),
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// A grade with its remark, e.g. ("B", "Very Good").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeMark {
    pub grade: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GradingConfiguration {
    pub id: GradingConfigurationId,
    pub name: String,
    pub description: Option<String>,
    /// Classes this table applies to.
    pub class_ids: Vec<ClassId>,
    pub bands: Json<Vec<GradeBand>>,
    pub is_active: bool,
    /// Used for classes not listed by any other active configuration.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
