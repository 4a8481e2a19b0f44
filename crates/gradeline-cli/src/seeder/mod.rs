//! Database seeding.
//!
//! Builds a complete school year for local development: the class ladder, a
//! subject list, one academic session with its terms, students in every
//! class and a score sheet per student, subject and term.

pub mod classes;
pub mod models;
pub mod scores;
pub mod students;

use chrono::NaiveDate;
use gradeline::modules::AcademicSessionService;
use gradeline::store::{PgStore, SessionDirectory};
use gradeline_config::CalendarConfig;
use gradeline_core::AppError;
use gradeline_models::{AcademicSession, CreateAcademicSessionDto};
use sqlx::PgPool;
use std::time::Instant;

pub use models::{ScoreSeed, SeedConfig, StudentSeed};

/// Seeds everything described by `config`.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!("   - Session: {}", config.session_name());
    println!(
        "   - Students: {} ({} per class)",
        config.total_students(),
        config.students_per_class
    );

    let classes = classes::seed_classes(db).await?;
    let subject_ids = classes::seed_subjects(db).await?;
    let session = seed_session(db, &config).await?;

    let class_ids: Vec<_> = classes.iter().map(|(id, _)| *id).collect();
    let students = students::seed_students(
        db,
        &class_ids,
        config.students_per_class,
        session.id,
        config.session_start_year,
    )
    .await?;

    if config.with_scores {
        scores::seed_scores(db, &students, &subject_ids, session.id).await?;
    }

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    Ok(())
}

/// Creates the seeded session with its three terms, or reuses it when a
/// session with the same name exists.
pub async fn seed_session(
    db: &PgPool,
    config: &SeedConfig,
) -> Result<AcademicSession, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let name = config.session_name();
    println!("📅 Seeding academic session {}...", name);

    let mut tx = db.begin().await?;
    let mut store = PgStore::new(&mut *tx);

    if let Some(existing) = store
        .list_sessions()
        .await
        .map_err(AppError::into_anyhow)?
        .into_iter()
        .find(|s| s.name == name)
    {
        println!("   ✓ Reusing existing session in {:?}", start_time.elapsed());
        return Ok(existing);
    }

    let year = config.session_start_year;
    let (start_date, end_date) = match (
        NaiveDate::from_ymd_opt(year, 9, 1),
        NaiveDate::from_ymd_opt(year + 1, 7, 31),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(format!("invalid session year {}", year).into()),
    };

    let dto = CreateAcademicSessionDto {
        name,
        start_date,
        end_date,
        is_current: true,
    };
    let today = CalendarConfig::from_env().today();
    let overview = AcademicSessionService::create_academic_session(&mut store, dto, today)
        .await
        .map_err(AppError::into_anyhow)?;
    drop(store);
    tx.commit().await?;

    println!(
        "   ✓ Inserted session with {} terms in {:?}",
        overview.terms.len(),
        start_time.elapsed()
    );

    Ok(overview.session)
}

/// Removes seeded students (with their scores), the seeded session when it
/// is left empty, and unused seeded classes and subjects.
pub async fn clear_all(db: &PgPool, session_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    students::clear_students(db).await?;

    let sessions = sqlx::query(
        "DELETE FROM academic_sessions a
         WHERE a.name = $1
         AND NOT EXISTS (SELECT 1 FROM scores sc WHERE sc.academic_session_id = a.id)",
    )
    .bind(session_name)
    .execute(db)
    .await?
    .rows_affected();
    println!("   ✓ Deleted {} academic sessions", sessions);

    classes::clear_classes_and_subjects(db).await?;

    println!("\n✅ Seeded data cleared in {:?}", start_time.elapsed());
    Ok(())
}
