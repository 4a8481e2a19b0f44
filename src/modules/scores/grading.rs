//! Grade derivation.
//!
//! [`derive_total_and_grade`] is the single place a total and grade are
//! computed from raw marks. Score recording persists its output; promotion
//! calls it transiently for rows whose stored totals are missing.

use gradeline_models::{GradeBand, GradeMark, GradingConfiguration, ScoreComponents};

/// Built-in thresholds: (minimum, grade, remark), highest first.
const DEFAULT_THRESHOLDS: [(f64, &str, &str); 6] = [
    (80.0, "A", "Excellent"),
    (70.0, "B", "Very Good"),
    (60.0, "C", "Good"),
    (50.0, "D", "Fair"),
    (40.0, "E", "Pass"),
    (f64::NEG_INFINITY, "F", "Fail"),
];

/// Grades counted as a pass by promotion rules.
pub const PASS_GRADES: [&str; 3] = ["A", "B", "C"];

/// An ordered grading table. An empty table grades with the built-in
/// thresholds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradingTable {
    bands: Vec<GradeBand>,
}

impl GradingTable {
    pub fn new(bands: Vec<GradeBand>) -> Self {
        Self { bands }
    }

    /// The built-in A-F table.
    pub fn default_table() -> Self {
        Self::default()
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    /// First band containing `score`, else the built-in thresholds.
    pub fn grade(&self, score: f64) -> GradeMark {
        if let Some(band) = self.bands.iter().find(|band| band.contains(score)) {
            return GradeMark {
                grade: band.grade.clone(),
                remark: band.remark.clone(),
            };
        }
        default_grade(score)
    }
}

impl From<GradingConfiguration> for GradingTable {
    fn from(config: GradingConfiguration) -> Self {
        Self::new(config.bands.0)
    }
}

impl From<Option<GradingConfiguration>> for GradingTable {
    fn from(config: Option<GradingConfiguration>) -> Self {
        config.map(Self::from).unwrap_or_default()
    }
}

fn default_grade(score: f64) -> GradeMark {
    let (_, grade, remark) = DEFAULT_THRESHOLDS
        .iter()
        .find(|(min, _, _)| score >= *min)
        .copied()
        .unwrap_or(DEFAULT_THRESHOLDS[DEFAULT_THRESHOLDS.len() - 1]);

    GradeMark {
        grade: grade.to_string(),
        remark: remark.to_string(),
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total of the present components and its grade. Both are `None` when no
/// component is present.
pub fn derive_total_and_grade(
    components: &ScoreComponents,
    table: &GradingTable,
) -> (Option<f64>, Option<GradeMark>) {
    if components.is_empty() {
        return (None, None);
    }

    let total = round2(
        [components.first_ca, components.second_ca, components.exam_score]
            .into_iter()
            .flatten()
            .sum(),
    );

    (Some(total), Some(table.grade(total)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let table = GradingTable::default_table();
        let grade = |s| table.grade(s).grade;

        assert_eq!(grade(100.0), "A");
        assert_eq!(grade(80.0), "A");
        assert_eq!(grade(79.99), "B");
        assert_eq!(grade(60.0), "C");
        assert_eq!(grade(50.0), "D");
        assert_eq!(grade(40.0), "E");
        assert_eq!(grade(39.5), "F");
        assert_eq!(grade(0.0), "F");
        assert_eq!(table.grade(72.0).remark, "Very Good");
    }

    #[test]
    fn test_configured_bands_take_precedence() {
        let table = GradingTable::new(vec![
            GradeBand::new("A1", 75.0, 100.0, "Distinction"),
            GradeBand::new("C4", 50.0, 74.99, "Credit"),
        ]);

        assert_eq!(table.grade(80.0).grade, "A1");
        assert_eq!(table.grade(60.0).remark, "Credit");
        // Not covered by any band: built-in thresholds apply.
        assert_eq!(table.grade(45.0).grade, "E");
    }

    #[test]
    fn test_total_sums_present_components() {
        let table = GradingTable::default_table();

        let (total, mark) = derive_total_and_grade(
            &ScoreComponents::new(Some(15.0), None, Some(56.5)),
            &table,
        );
        assert_eq!(total, Some(71.5));
        assert_eq!(mark.unwrap().grade, "B");

        let (total, mark) = derive_total_and_grade(&ScoreComponents::default(), &table);
        assert!(total.is_none());
        assert!(mark.is_none());
    }

    #[test]
    fn test_total_is_rounded() {
        let (total, _) = derive_total_and_grade(
            &ScoreComponents::new(Some(10.1), Some(10.2), Some(40.004)),
            &GradingTable::default_table(),
        );
        assert_eq!(total, Some(60.3));
    }
}
