//! Student seeding functionality.

use fake::Fake;
use fake::faker::name::en::*;
use gradeline_models::{AcademicSessionId, ClassId, StudentId, TermName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{ADMISSION_PREFIX, StudentSeed};

/// Generates students for every class in parallel.
pub fn generate_students(
    class_ids: &[ClassId],
    students_per_class: usize,
    session_id: AcademicSessionId,
    session_start_year: i32,
) -> Vec<StudentSeed> {
    class_ids
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, &class_id)| {
            (0..students_per_class)
                .map(|student_idx| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();

                    StudentSeed {
                        first_name,
                        last_name,
                        admission_number: format!(
                            "{}{}-{:06}",
                            ADMISSION_PREFIX,
                            session_start_year,
                            class_idx * 10_000 + student_idx
                        ),
                        class_id,
                        admission_academic_session_id: session_id,
                        admission_term: TermName::First,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Seeds students into the database, returning `(student, class)` pairs.
pub async fn seed_students(
    db: &PgPool,
    class_ids: &[ClassId],
    students_per_class: usize,
    session_id: AcademicSessionId,
    session_start_year: i32,
) -> Result<Vec<(StudentId, ClassId)>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} students ({} per class)...",
        class_ids.len() * students_per_class,
        students_per_class
    );

    let students = generate_students(class_ids, students_per_class, session_id, session_start_year);
    let ids = insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Inserts students in batches, skipping admission numbers that already exist.
pub async fn insert_students_batch(
    db: &PgPool,
    students: &[StudentSeed],
) -> Result<Vec<(StudentId, ClassId)>, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 6 params per student
    const BATCH_SIZE: usize = 1000;

    let mut all_ids = Vec::with_capacity(students.len());
    for chunk in students.chunks(BATCH_SIZE) {
        all_ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<Vec<(StudentId, ClassId)>, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO students (first_name, last_name, admission_number, class_id, admission_academic_session_id, admission_term) VALUES ",
    );

    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6
        ));
    }

    query.push_str(" ON CONFLICT (admission_number) DO NOTHING RETURNING id, class_id");

    let mut q = sqlx::query_as(&query);
    for student in students {
        q = q
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.admission_number)
            .bind(student.class_id)
            .bind(student.admission_academic_session_id)
            .bind(student.admission_term);
    }

    let rows: Vec<(StudentId, ClassId)> = q.fetch_all(&mut **tx).await?;
    Ok(rows)
}

/// Clears all seeded students. Their scores and class history go with them.
pub async fn clear_students(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded students...");

    let result = sqlx::query("DELETE FROM students WHERE admission_number LIKE $1 || '%'")
        .bind(ADMISSION_PREFIX)
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} students in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}
