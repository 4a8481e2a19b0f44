//! Class positions.
//!
//! Competition ranking ("1224"): tied scores share a rank equal to one plus
//! the number of entries strictly ahead. Scores are compared at two decimal
//! places so that float noise in summed totals cannot split a tie. Equal
//! scores are listed in id order, which does not affect their rank.

use std::collections::BTreeMap;

use gradeline_models::{
    AcademicSessionId, ClassId, ClassRankings, Position, Score, StudentId, SubjectId,
    SubjectRanking, TermName,
};

use crate::modules::scores::grading::{GradingTable, derive_total_and_grade, round2};

fn cents(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Display label for `rank` within a cohort of `cohort_size` (0 when unknown).
///
/// - ranks 1-3: `"1st / 10"`, or just `"1st"` without a cohort size
/// - lower ranks: `"Top {p}%"`, where `p = round((n - rank + 1) / n * 100)`
///   clamped to 1..=99
/// - anything else: `"-"`
pub fn format_rank_label(rank: u32, cohort_size: usize) -> String {
    match rank {
        0 => "-".to_string(),
        1..=3 if cohort_size == 0 => ordinal(rank),
        1..=3 => format!("{} / {}", ordinal(rank), cohort_size),
        _ if cohort_size == 0 => "-".to_string(),
        _ => {
            let n = cohort_size as f64;
            let ahead_or_level = cohort_size as i64 - i64::from(rank) + 1;
            let percentile = ((ahead_or_level as f64 / n) * 100.0).round() as i64;
            format!("Top {}%", percentile.clamp(1, 99))
        }
    }
}

pub struct RankingEngine;

impl RankingEngine {
    /// Rank `(id, score)` entries, best first.
    pub fn rank<K: Copy + Ord>(entries: &[(K, f64)]) -> Vec<Position<K>> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|(a_id, a), (b_id, b)| cents(*b).cmp(&cents(*a)).then(a_id.cmp(b_id)));

        let cohort_size = sorted.len();
        let mut positions: Vec<Position<K>> = Vec::with_capacity(cohort_size);

        for (index, (id, score)) in sorted.into_iter().enumerate() {
            let rank = match positions.last() {
                Some(prev) if cents(prev.score) == cents(score) => prev.rank,
                _ => index as u32 + 1,
            };
            positions.push(Position {
                id,
                score,
                rank,
                label: format_rank_label(rank, cohort_size),
            });
        }

        positions
    }

    /// Subject and overall positions for one `(class, session, term)` cohort.
    ///
    /// `scores` should be the cohort's active score rows. A row without a
    /// stored total falls back to the sum of its components; rows with no
    /// marks at all are left out. The overall position ranks each student's
    /// sum of subject totals.
    pub fn class_rankings(
        class_id: ClassId,
        academic_session_id: AcademicSessionId,
        term: TermName,
        scores: &[Score],
    ) -> ClassRankings {
        let mut by_subject: BTreeMap<SubjectId, Vec<(StudentId, f64)>> = BTreeMap::new();
        let mut totals: BTreeMap<StudentId, f64> = BTreeMap::new();

        for score in scores {
            let Some(total) = score_total(score) else {
                continue;
            };
            by_subject
                .entry(score.subject_id)
                .or_default()
                .push((score.student_id, total));
            *totals.entry(score.student_id).or_default() += total;
        }

        let subjects = by_subject
            .into_iter()
            .map(|(subject_id, entries)| SubjectRanking {
                subject_id,
                positions: Self::rank(&entries),
            })
            .collect();

        let overall: Vec<(StudentId, f64)> = totals
            .into_iter()
            .map(|(student, total)| (student, round2(total)))
            .collect();

        ClassRankings {
            class_id,
            academic_session_id,
            term,
            subjects,
            overall: Self::rank(&overall),
        }
    }
}

/// Stored total, else the sum of whatever components are present.
pub fn score_total(score: &Score) -> Option<f64> {
    score
        .total_score
        .or_else(|| derive_total_and_grade(&score.components(), &GradingTable::default_table()).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradeline_models::ScoreId;

    fn ranks(scores: &[f64]) -> Vec<u32> {
        let entries: Vec<(u32, f64)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u32, *s))
            .collect();
        RankingEngine::rank(&entries)
            .into_iter()
            .map(|p| p.rank)
            .collect()
    }

    #[test]
    fn test_ordinals() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (101, "101st"),
            (111, "111th"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal(n), expected);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(format_rank_label(1, 10), "1st / 10");
        assert_eq!(format_rank_label(2, 10), "2nd / 10");
        assert_eq!(format_rank_label(3, 10), "3rd / 10");
        assert_eq!(format_rank_label(4, 10), "Top 70%");
        assert_eq!(format_rank_label(10, 10), "Top 10%");
        assert_eq!(format_rank_label(4, 4), "Top 25%");
    }

    #[test]
    fn test_percentile_is_clamped() {
        assert_eq!(format_rank_label(4, 1000), "Top 99%");
        assert_eq!(format_rank_label(500, 400), "Top 1%");
    }

    #[test]
    fn test_unknown_cohort() {
        assert_eq!(format_rank_label(2, 0), "2nd");
        assert_eq!(format_rank_label(7, 0), "-");
        assert_eq!(format_rank_label(0, 10), "-");
    }

    #[test]
    fn test_competition_ranking_with_ties() {
        assert_eq!(ranks(&[90.0, 80.0, 90.0, 70.0]), vec![1, 1, 3, 4]);
        assert_eq!(ranks(&[50.0, 50.0, 50.0]), vec![1, 1, 1]);
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 30.0, 5.0]), vec![1, 2, 2, 4, 5]);
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn test_ties_resolved_by_score_not_input_order() {
        let a = RankingEngine::rank(&[(1u32, 88.0), (2, 88.0), (3, 95.0)]);
        let b = RankingEngine::rank(&[(3u32, 95.0), (2, 88.0), (1, 88.0)]);
        assert_eq!(a, b);
        assert_eq!(a[1].label, "2nd / 3");
        assert_eq!(a[2].label, "2nd / 3");
    }

    #[test]
    fn test_float_noise_does_not_split_ties() {
        let positions = RankingEngine::rank(&[(1u32, 0.1 + 0.2), (2, 0.3)]);
        assert_eq!(positions[0].rank, positions[1].rank);
    }

    fn score(student: StudentId, subject: SubjectId, total: Option<f64>, exam: Option<f64>) -> Score {
        let now = Utc::now();
        Score {
            id: ScoreId::new(),
            student_id: student,
            subject_id: subject,
            class_id: ClassId::from_u128(1),
            academic_session_id: AcademicSessionId::from_u128(2),
            term: TermName::First,
            first_ca: None,
            second_ca: None,
            exam_score: exam,
            total_score: total,
            grade: None,
            remark: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_class_rankings_subject_and_overall() {
        let (ada, bayo, chi) = (StudentId::new(), StudentId::new(), StudentId::new());
        let (maths, english) = (SubjectId::new(), SubjectId::new());
        let scores = vec![
            score(ada, maths, Some(90.0), None),
            score(bayo, maths, Some(70.0), None),
            score(chi, maths, None, Some(70.0)),
            score(ada, english, Some(40.0), None),
            score(bayo, english, Some(80.0), None),
            score(chi, english, None, None),
        ];

        let rankings = RankingEngine::class_rankings(
            ClassId::from_u128(1),
            AcademicSessionId::from_u128(2),
            TermName::First,
            &scores,
        );

        let maths_chi = rankings.subject_position(maths, chi).unwrap();
        assert_eq!(maths_chi.rank, 2);
        assert_eq!(maths_chi.label, "2nd / 3");

        // Chi has no English marks at all and is not ranked there.
        assert!(rankings.subject_position(english, chi).is_none());
        assert_eq!(rankings.subject_position(english, bayo).unwrap().label, "1st / 2");

        assert_eq!(rankings.overall_position(bayo).unwrap().score, 150.0);
        assert_eq!(rankings.overall_position(bayo).unwrap().rank, 1);
        assert_eq!(rankings.overall_position(ada).unwrap().rank, 2);
        assert_eq!(rankings.overall_position(chi).unwrap().label, "3rd / 3");
    }
}
