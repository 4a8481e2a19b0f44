//! Operator commands.
//!
//! Each command opens its own connection or transaction, calls one service
//! and prints the outcome. Failures are printed and exit with status 1.

pub mod handlers;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use gradeline_models::{
    AcademicSessionId, ClassId, PromotionCriteria, PromotionRuleId, RecordScoreDto, StudentId,
    SubjectId, TermId, TermName,
};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "gradeline")]
#[command(about = "Gradeline - results and promotion management", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Show the current session and term (updates the current flags first)
    Current,
    /// List all sessions with their terms and statuses
    Sessions,
    /// Create an academic session and its three terms
    CreateSession {
        /// Session name, e.g. "2024/2025"
        #[arg(short = 'n', long)]
        name: String,

        /// First day of the session (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the session (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Pin the new session as current
        #[arg(long)]
        current: bool,
    },
    /// Delete an academic session that has no scores
    DeleteSession {
        session: AcademicSessionId,
    },
    /// Pin a session as current
    SetCurrentSession {
        session: AcademicSessionId,
    },
    /// Pin a term as current
    SetCurrentTerm {
        #[arg(long)]
        session: AcademicSessionId,

        #[arg(long)]
        term: TermId,
    },
    /// Create a promotion rule
    CreateRule {
        #[arg(short = 'n', long)]
        name: String,

        /// all_promote, minimum_grades, minimum_average or minimum_subjects_passed
        #[arg(short = 'k', long)]
        kind: String,

        #[arg(long)]
        description: Option<String>,

        /// Minimum number of A grades (minimum_grades)
        #[arg(long)]
        min_a: Option<u32>,

        /// Minimum number of B grades (minimum_grades)
        #[arg(long)]
        min_b: Option<u32>,

        /// Minimum number of C grades (minimum_grades)
        #[arg(long)]
        min_c: Option<u32>,

        /// Minimum average across subjects (minimum_average)
        #[arg(long)]
        min_average: Option<f64>,

        /// Minimum number of subjects graded A-C (minimum_subjects_passed)
        #[arg(long)]
        min_passed: Option<u32>,

        /// Make this the active rule
        #[arg(long)]
        activate: bool,
    },
    /// Make a promotion rule the active one
    ActivateRule {
        rule: PromotionRuleId,
    },
    /// Record (create or replace) a score sheet
    RecordScore {
        #[arg(long)]
        student: StudentId,

        #[arg(long)]
        subject: SubjectId,

        /// first, second or third
        #[arg(long)]
        term: TermName,

        /// Defaults to the student's current class
        #[arg(long)]
        class: Option<ClassId>,

        /// Defaults to the current session
        #[arg(long)]
        session: Option<AcademicSessionId>,

        #[arg(long)]
        first_ca: Option<f64>,

        #[arg(long)]
        second_ca: Option<f64>,

        #[arg(long)]
        exam: Option<f64>,
    },
    /// Subject and overall positions of a class for one term
    Rankings {
        #[arg(long)]
        class: ClassId,

        #[arg(long)]
        session: AcademicSessionId,

        #[arg(long)]
        term: TermName,
    },
    /// Report card data for one student and term
    Report {
        #[arg(long)]
        student: StudentId,

        #[arg(long)]
        term: TermName,

        /// Defaults to the current session
        #[arg(long)]
        session: Option<AcademicSessionId>,
    },
    /// Every result a student may see
    Results {
        #[arg(long)]
        student: StudentId,

        #[arg(long)]
        session: Option<AcademicSessionId>,
    },
    /// Promote, repeat or graduate students at the end of a session
    Promote {
        #[arg(long)]
        session: AcademicSessionId,

        /// Only students of this class
        #[arg(long)]
        class: Option<ClassId>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

pub async fn run(state: &AppState, command: Commands) {
    match command {
        Commands::Migrate => handlers::handle_migrate(state).await,
        Commands::Current => handlers::handle_current(state).await,
        Commands::Sessions => handlers::handle_sessions(state).await,
        Commands::CreateSession {
            name,
            start,
            end,
            current,
        } => handlers::handle_create_session(state, name, start, end, current).await,
        Commands::DeleteSession { session } => {
            handlers::handle_delete_session(state, session).await
        }
        Commands::SetCurrentSession { session } => {
            handlers::handle_set_current_session(state, session).await
        }
        Commands::SetCurrentTerm { session, term } => {
            handlers::handle_set_current_term(state, session, term).await
        }
        Commands::CreateRule {
            name,
            kind,
            description,
            min_a,
            min_b,
            min_c,
            min_average,
            min_passed,
            activate,
        } => {
            let criteria = PromotionCriteria {
                min_a_count: min_a,
                min_b_count: min_b,
                min_c_count: min_c,
                min_average,
                min_passed,
            };
            handlers::handle_create_rule(state, name, kind, description, criteria, activate).await
        }
        Commands::ActivateRule { rule } => handlers::handle_activate_rule(state, rule).await,
        Commands::RecordScore {
            student,
            subject,
            term,
            class,
            session,
            first_ca,
            second_ca,
            exam,
        } => {
            let dto = RecordScoreDto {
                student_id: student,
                subject_id: subject,
                class_id: class,
                academic_session_id: session,
                term,
                first_ca,
                second_ca,
                exam_score: exam,
            };
            handlers::handle_record_score(state, dto).await
        }
        Commands::Rankings {
            class,
            session,
            term,
        } => handlers::handle_rankings(state, class, session, term).await,
        Commands::Report {
            student,
            term,
            session,
        } => handlers::handle_report(state, student, term, session).await,
        Commands::Results { student, session } => {
            handlers::handle_results(state, student, session).await
        }
        Commands::Promote {
            session,
            class,
            yes,
        } => handlers::handle_promote(state, session, class, yes).await,
    }
}
