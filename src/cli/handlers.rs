use chrono::NaiveDate;
use dialoguer::Confirm;
use serde::Serialize;

use gradeline_core::AppError;
use gradeline_db::run_migrations;
use gradeline_observability::export_metrics;
use gradeline_models::{
    AcademicSessionId, ClassId, CreateAcademicSessionDto, CreatePromotionRuleDto,
    PromotionCriteria, PromotionRuleId, PromotionRuleKind, RecordScoreDto, RunPromotionDto,
    StudentId, TermId, TermName,
};

use crate::modules::{AcademicSessionService, PromotionService, ResultsService, ScoreService};
use crate::state::AppState;
use crate::store::PgStore;

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error formatting output", e),
    }
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    export_metrics();
    std::process::exit(1);
}

pub async fn handle_migrate(state: &AppState) {
    match run_migrations(&state.db).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => fail("Error running migrations", e),
    }
}

pub async fn handle_current(state: &AppState) {
    let today = state.config.calendar.today();
    let result = async {
        let mut tx = state.db.begin().await?;
        let period =
            AcademicSessionService::current_period(&mut PgStore::new(&mut *tx), today).await?;
        tx.commit().await?;
        Ok::<_, AppError>(period)
    }
    .await;

    match result {
        Ok(period) => print_json(&period),
        Err(e) => fail("Error reading current period", e),
    }
}

pub async fn handle_sessions(state: &AppState) {
    let today = state.config.calendar.today();
    let result = async {
        let mut conn = state.db.acquire().await?;
        AcademicSessionService::list_sessions_with_status(&mut PgStore::new(&mut *conn), today)
            .await
    }
    .await;

    match result {
        Ok(sessions) => print_json(&sessions),
        Err(e) => fail("Error listing sessions", e),
    }
}

pub async fn handle_create_session(
    state: &AppState,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_current: bool,
) {
    let dto = CreateAcademicSessionDto {
        name,
        start_date,
        end_date,
        is_current,
    };
    let today = state.config.calendar.today();
    let result = async {
        let mut tx = state.db.begin().await?;
        let created =
            AcademicSessionService::create_academic_session(&mut PgStore::new(&mut *tx), dto, today)
                .await?;
        tx.commit().await?;
        Ok::<_, AppError>(created)
    }
    .await;

    match result {
        Ok(overview) => {
            println!("✅ Academic session created");
            println!("   ID: {}", overview.session.id);
            println!("   Name: {}", overview.session.name);
            for term in &overview.terms {
                println!(
                    "   {}: {} to {} ({})",
                    term.item.name.display_name(),
                    term.item.start_date,
                    term.item.end_date,
                    term.status
                );
            }
        }
        Err(e) => fail("Error creating academic session", e),
    }
}

pub async fn handle_delete_session(state: &AppState, session_id: AcademicSessionId) {
    match AcademicSessionService::remove_academic_session(
        &state.db,
        state.cache.as_ref(),
        session_id,
    )
    .await
    {
        Ok(()) => println!("✅ Academic session deleted"),
        Err(e) => fail("Error deleting academic session", e),
    }
}

pub async fn handle_set_current_session(state: &AppState, session_id: AcademicSessionId) {
    let result = async {
        let mut tx = state.db.begin().await?;
        let session =
            AcademicSessionService::set_current_session(&mut PgStore::new(&mut *tx), session_id)
                .await?;
        tx.commit().await?;
        Ok::<_, AppError>(session)
    }
    .await;

    match result {
        Ok(session) => println!("✅ {} is now the current session", session.name),
        Err(e) => fail("Error setting current session", e),
    }
}

pub async fn handle_set_current_term(
    state: &AppState,
    session_id: AcademicSessionId,
    term_id: TermId,
) {
    let result = async {
        let mut tx = state.db.begin().await?;
        let term = AcademicSessionService::set_current_term(
            &mut PgStore::new(&mut *tx),
            session_id,
            term_id,
        )
        .await?;
        tx.commit().await?;
        Ok::<_, AppError>(term)
    }
    .await;

    match result {
        Ok(term) => println!("✅ {} is now the current term", term.name.display_name()),
        Err(e) => fail("Error setting current term", e),
    }
}

pub async fn handle_create_rule(
    state: &AppState,
    name: String,
    kind: String,
    description: Option<String>,
    criteria: PromotionCriteria,
    is_active: bool,
) {
    let kind = PromotionRuleKind::from(kind);
    if !kind.is_recognized() {
        fail("Error creating promotion rule", format!("unknown rule kind '{}'", kind));
    }

    let dto = CreatePromotionRuleDto {
        name,
        description,
        kind,
        criteria,
        is_active,
    };
    let result = async {
        let mut tx = state.db.begin().await?;
        let rule = PromotionService::create_rule(&mut PgStore::new(&mut *tx), dto).await?;
        tx.commit().await?;
        Ok::<_, AppError>(rule)
    }
    .await;

    match result {
        Ok(rule) => {
            println!("✅ Promotion rule created");
            println!("   ID: {}", rule.id);
            println!("   Kind: {}", rule.kind);
            println!("   Active: {}", rule.is_active);
        }
        Err(e) => fail("Error creating promotion rule", e),
    }
}

pub async fn handle_activate_rule(state: &AppState, rule_id: PromotionRuleId) {
    let result = async {
        let mut tx = state.db.begin().await?;
        PromotionService::activate_rule(&mut PgStore::new(&mut *tx), rule_id).await?;
        tx.commit().await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => println!("✅ Promotion rule activated"),
        Err(e) => fail("Error activating promotion rule", e),
    }
}

pub async fn handle_record_score(state: &AppState, dto: RecordScoreDto) {
    match ScoreService::save_score(&state.db, state.cache.as_ref(), dto).await {
        Ok(score) => print_json(&score),
        Err(e) => fail("Error recording score", e),
    }
}

pub async fn handle_rankings(
    state: &AppState,
    class_id: ClassId,
    session_id: AcademicSessionId,
    term: TermName,
) {
    let result = async {
        let mut conn = state.db.acquire().await?;
        ResultsService::class_rankings(
            &mut PgStore::new(&mut *conn),
            state.rankings_cache(),
            class_id,
            session_id,
            term,
        )
        .await
    }
    .await;

    match result {
        Ok(rankings) => print_json(&rankings),
        Err(e) => fail("Error computing rankings", e),
    }
}

pub async fn handle_report(
    state: &AppState,
    student_id: StudentId,
    term: TermName,
    session_id: Option<AcademicSessionId>,
) {
    let result = async {
        let mut conn = state.db.acquire().await?;
        ResultsService::student_term_report(
            &mut PgStore::new(&mut *conn),
            state.rankings_cache(),
            student_id,
            term,
            session_id,
        )
        .await
    }
    .await;

    match result {
        Ok(report) => print_json(&report),
        Err(e) => fail("Error building report", e),
    }
}

pub async fn handle_results(
    state: &AppState,
    student_id: StudentId,
    session_id: Option<AcademicSessionId>,
) {
    let result = async {
        let mut conn = state.db.acquire().await?;
        ResultsService::student_results(&mut PgStore::new(&mut *conn), student_id, session_id)
            .await
    }
    .await;

    match result {
        Ok(results) => print_json(&results),
        Err(e) => fail("Error loading results", e),
    }
}

pub async fn handle_promote(
    state: &AppState,
    session_id: AcademicSessionId,
    class_id: Option<ClassId>,
    yes: bool,
) {
    if !yes {
        let scope = match class_id {
            Some(class_id) => format!("students of class {}", class_id),
            None => "all students".to_string(),
        };
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Run promotion for {} in session {}? This updates every student's class and status",
                scope, session_id
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmed {
            println!("Promotion cancelled");
            return;
        }
    }

    let dto = RunPromotionDto {
        academic_session_id: session_id,
        class_id,
    };

    match PromotionService::run_promotion(&state.db, state.cache.as_ref(), dto).await {
        Ok(summary) => {
            println!("\n✅ Promotion complete");
            println!("   Promoted: {}", summary.promoted);
            println!("   Repeated: {}", summary.repeated);
            println!("   Graduated: {}", summary.graduated);
            println!("   Skipped (no results): {}", summary.skipped);
            println!("   Total: {}", summary.total);
        }
        Err(e) => fail("Error running promotion", e),
    }
}
