//! Score seeding functionality.
//!
//! Every student gets a sheet for every subject and term. Totals and grades
//! are derived with the built-in grading table, the same way recorded scores
//! are.

use gradeline::modules::scores::{GradingTable, derive_total_and_grade};
use gradeline_models::{
    AcademicSessionId, ClassId, ScoreComponents, StudentId, SubjectId, TermName,
};
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::ScoreSeed;

/// Generates random score sheets in parallel.
pub fn generate_scores(
    students: &[(StudentId, ClassId)],
    subject_ids: &[SubjectId],
    session_id: AcademicSessionId,
) -> Vec<ScoreSeed> {
    let table = GradingTable::default_table();

    students
        .par_iter()
        .flat_map(|&(student_id, class_id)| {
            let mut rng = rand::thread_rng();
            // A per-student ability keeps one student's marks roughly consistent.
            let ability: f64 = rng.gen_range(0.35..1.0);
            let mut sheets = Vec::with_capacity(subject_ids.len() * TermName::ALL.len());

            for term in TermName::ALL {
                for &subject_id in subject_ids {
                    let first_ca = mark(&mut rng, 20.0, ability);
                    let second_ca = mark(&mut rng, 20.0, ability);
                    let exam_score = mark(&mut rng, 60.0, ability);

                    let components =
                        ScoreComponents::new(Some(first_ca), Some(second_ca), Some(exam_score));
                    let (total_score, grade) = derive_total_and_grade(&components, &table);

                    sheets.push(ScoreSeed {
                        student_id,
                        subject_id,
                        class_id,
                        academic_session_id: session_id,
                        term,
                        first_ca,
                        second_ca,
                        exam_score,
                        total_score,
                        remark: grade.as_ref().map(|g| g.remark.clone()),
                        grade: grade.map(|g| g.grade),
                    });
                }
            }

            sheets
        })
        .collect()
}

fn mark(rng: &mut impl Rng, max: f64, ability: f64) -> f64 {
    let spread: f64 = rng.gen_range(-0.2..0.2);
    ((ability + spread).clamp(0.0, 1.0) * max).round()
}

/// Seeds score sheets into the database.
pub async fn seed_scores(
    db: &PgPool,
    students: &[(StudentId, ClassId)],
    subject_ids: &[SubjectId],
    session_id: AcademicSessionId,
) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "📝 Seeding {} score sheets...",
        students.len() * subject_ids.len() * TermName::ALL.len()
    );

    let scores = generate_scores(students, subject_ids, session_id);
    let inserted = insert_scores_batch(db, &scores).await?;

    println!(
        "   ✓ Inserted {} score sheets in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

pub async fn insert_scores_batch(
    db: &PgPool,
    scores: &[ScoreSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 11 params per sheet
    const BATCH_SIZE: usize = 500;

    let mut inserted = 0;
    for chunk in scores.chunks(BATCH_SIZE) {
        inserted += insert_scores_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_scores_chunk(
    tx: &mut Transaction<'_, Postgres>,
    scores: &[ScoreSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    if scores.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO scores (student_id, subject_id, class_id, academic_session_id, term, first_ca, second_ca, exam_score, total_score, grade, remark) VALUES ",
    );

    for i in 0..scores.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let placeholders: Vec<String> = (1..=11).map(|p| format!("${}", i * 11 + p)).collect();
        query.push('(');
        query.push_str(&placeholders.join(", "));
        query.push(')');
    }

    query.push_str(" ON CONFLICT ON CONSTRAINT scores_unique DO NOTHING");

    let mut q = sqlx::query(&query);
    for score in scores {
        q = q
            .bind(score.student_id)
            .bind(score.subject_id)
            .bind(score.class_id)
            .bind(score.academic_session_id)
            .bind(score.term)
            .bind(score.first_ca)
            .bind(score.second_ca)
            .bind(score.exam_score)
            .bind(score.total_score)
            .bind(&score.grade)
            .bind(&score.remark);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}
