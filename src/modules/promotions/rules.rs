//! Promotion eligibility.

use gradeline_models::{PromotionCriteria, PromotionRule, PromotionRuleKind, SubjectId};

use crate::modules::scores::grading::PASS_GRADES;

/// A student's best result in one subject across the session's terms.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectResult {
    pub subject_id: SubjectId,
    pub total_score: f64,
    pub grade: String,
}

impl SubjectResult {
    fn has_grade(&self, grade: &str) -> bool {
        self.grade.trim().eq_ignore_ascii_case(grade)
    }

    fn is_pass(&self) -> bool {
        PASS_GRADES.iter().any(|g| self.has_grade(g))
    }
}

pub struct PromotionRuleEvaluator;

impl PromotionRuleEvaluator {
    pub fn evaluate(rule: &PromotionRule, results: &[SubjectResult]) -> bool {
        Self::is_eligible(&rule.kind, &rule.criteria, results)
    }

    /// Whether `results` satisfy a rule of `kind`. Unknown kinds are never
    /// eligible.
    pub fn is_eligible(
        kind: &PromotionRuleKind,
        criteria: &PromotionCriteria,
        results: &[SubjectResult],
    ) -> bool {
        match kind {
            PromotionRuleKind::AllPromote => true,
            PromotionRuleKind::MinimumGrades => {
                let count = |grade: &str| results.iter().filter(|r| r.has_grade(grade)).count();
                count("A") >= criteria.min_a_count()
                    && count("B") >= criteria.min_b_count()
                    && count("C") >= criteria.min_c_count()
            }
            PromotionRuleKind::MinimumAverage => match mean(results) {
                Some(average) => average >= criteria.min_average(),
                None => false,
            },
            PromotionRuleKind::MinimumSubjectsPassed => {
                results.iter().filter(|r| r.is_pass()).count() >= criteria.min_passed()
            }
            PromotionRuleKind::Unrecognized(_) => false,
        }
    }
}

fn mean(results: &[SubjectResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    let sum: f64 = results.iter().map(|r| r.total_score).sum();
    Some(sum / results.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(total: f64, grade: &str) -> SubjectResult {
        SubjectResult {
            subject_id: SubjectId::new(),
            total_score: total,
            grade: grade.to_string(),
        }
    }

    fn criteria() -> PromotionCriteria {
        PromotionCriteria::default()
    }

    #[test]
    fn test_all_promote_ignores_results() {
        assert!(PromotionRuleEvaluator::is_eligible(
            &PromotionRuleKind::AllPromote,
            &criteria(),
            &[]
        ));
        assert!(PromotionRuleEvaluator::is_eligible(
            &PromotionRuleKind::AllPromote,
            &criteria(),
            &[result(3.0, "F")]
        ));
    }

    #[test]
    fn test_minimum_average_boundary_is_inclusive() {
        let c = PromotionCriteria {
            min_average: Some(50.0),
            ..Default::default()
        };
        let kind = PromotionRuleKind::MinimumAverage;

        assert!(PromotionRuleEvaluator::is_eligible(
            &kind,
            &c,
            &[result(60.0, "C"), result(40.0, "E")]
        ));
        assert!(!PromotionRuleEvaluator::is_eligible(
            &kind,
            &c,
            &[result(60.0, "C"), result(39.0, "F")]
        ));
    }

    #[test]
    fn test_minimum_average_defaults_to_fifty() {
        let kind = PromotionRuleKind::MinimumAverage;
        assert!(PromotionRuleEvaluator::is_eligible(&kind, &criteria(), &[result(50.0, "D")]));
        assert!(!PromotionRuleEvaluator::is_eligible(&kind, &criteria(), &[result(49.99, "E")]));
        assert!(!PromotionRuleEvaluator::is_eligible(&kind, &criteria(), &[]));
    }

    #[test]
    fn test_minimum_grades_checks_every_count() {
        let c = PromotionCriteria {
            min_a_count: Some(1),
            min_b_count: Some(2),
            ..Default::default()
        };
        let kind = PromotionRuleKind::MinimumGrades;

        let enough = [result(85.0, "A"), result(72.0, "B"), result(71.0, " b ")];
        assert!(PromotionRuleEvaluator::is_eligible(&kind, &c, &enough));

        let short_on_b = [result(85.0, "A"), result(90.0, "A"), result(72.0, "B")];
        assert!(!PromotionRuleEvaluator::is_eligible(&kind, &c, &short_on_b));

        // No thresholds set: every student qualifies.
        assert!(PromotionRuleEvaluator::is_eligible(&kind, &criteria(), &[]));
    }

    #[test]
    fn test_minimum_subjects_passed() {
        let c = PromotionCriteria {
            min_passed: Some(2),
            ..Default::default()
        };
        let kind = PromotionRuleKind::MinimumSubjectsPassed;

        let results = [result(80.0, "A"), result(65.0, "C"), result(45.0, "E")];
        assert!(PromotionRuleEvaluator::is_eligible(&kind, &c, &results));
        assert!(!PromotionRuleEvaluator::is_eligible(&kind, &c, &results[1..]));

        // Default threshold is five passes.
        assert!(!PromotionRuleEvaluator::is_eligible(&kind, &criteria(), &results));
    }

    #[test]
    fn test_unrecognized_kind_fails_closed() {
        let kind = PromotionRuleKind::from("coin_flip");
        assert!(!PromotionRuleEvaluator::is_eligible(
            &kind,
            &criteria(),
            &[result(100.0, "A")]
        ));
    }
}
