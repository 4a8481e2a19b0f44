//! Class and subject seeding.
//!
//! Both tables have unique names, so seeding is idempotent: existing rows are
//! reused and their ids returned.

use gradeline_models::{ClassId, SubjectId};
use sqlx::PgPool;
use std::time::Instant;

use super::models::{CLASS_LADDER, SUBJECTS};

/// Seeds the class ladder, returning `(id, name)` pairs in ladder order.
pub async fn seed_classes(db: &PgPool) -> Result<Vec<(ClassId, String)>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", CLASS_LADDER.len());

    let mut tx = db.begin().await?;
    let mut classes = Vec::with_capacity(CLASS_LADDER.len());

    for name in CLASS_LADDER {
        let id: ClassId = sqlx::query_scalar(
            "INSERT INTO classes (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET is_active = TRUE, updated_at = NOW()
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;
        classes.push((id, name.to_string()));
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        classes.len(),
        start_time.elapsed()
    );

    Ok(classes)
}

/// Seeds the subject list.
pub async fn seed_subjects(db: &PgPool) -> Result<Vec<SubjectId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} subjects...", SUBJECTS.len());

    let mut query = String::from("INSERT INTO subjects (name, code) VALUES ");
    for i in 0..SUBJECTS.len() {
        if i > 0 {
            query.push_str(", ");
        }
        query.push_str(&format!("(${}, ${})", i * 2 + 1, i * 2 + 2));
    }
    query.push_str(" ON CONFLICT (name) DO UPDATE SET code = EXCLUDED.code RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for (name, code) in SUBJECTS {
        q = q.bind(name).bind(code);
    }

    let ids: Vec<SubjectId> = q.fetch_all(db).await?;

    println!(
        "   ✓ Inserted {} subjects in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Removes seeded classes and subjects that nothing references any more.
pub async fn clear_classes_and_subjects(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing unused seeded classes and subjects...");

    let class_names: Vec<String> = CLASS_LADDER.iter().map(|s| s.to_string()).collect();
    let classes = sqlx::query(
        "DELETE FROM classes c
         WHERE c.name = ANY($1)
         AND NOT EXISTS (SELECT 1 FROM students s WHERE s.class_id = c.id)
         AND NOT EXISTS (SELECT 1 FROM scores sc WHERE sc.class_id = c.id)",
    )
    .bind(&class_names)
    .execute(db)
    .await?
    .rows_affected();

    let subject_names: Vec<String> = SUBJECTS.iter().map(|(name, _)| name.to_string()).collect();
    let subjects = sqlx::query(
        "DELETE FROM subjects sj
         WHERE sj.name = ANY($1)
         AND NOT EXISTS (SELECT 1 FROM scores sc WHERE sc.subject_id = sj.id)",
    )
    .bind(&subject_names)
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Deleted {} classes and {} subjects in {:?}",
        classes,
        subjects,
        start_time.elapsed()
    );

    Ok(())
}
