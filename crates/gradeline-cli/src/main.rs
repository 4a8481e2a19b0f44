use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;
use gradeline_cli::seeder::{self, SeedConfig};
use gradeline_config::DatabaseConfig;
use gradeline_observability::init_basic_console_logging;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "gradeline-cli")]
#[command(about = "Gradeline CLI - Development data tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the class ladder, subjects, one session, students and scores
    Seed {
        /// Number of students per class
        #[arg(short = 's', long, default_value = "20")]
        students: usize,

        /// Year the seeded session starts in
        #[arg(short = 'y', long, default_value = "2024")]
        year: i32,

        /// Skip score sheets
        #[arg(long)]
        no_scores: bool,
    },
    /// Clear seeded students, the seeded session and unused ladder classes
    Clear {
        /// Year of the seeded session to remove
        #[arg(long, default_value = "2024")]
        year: i32,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Seed {
            students,
            year,
            no_scores,
        } => handle_seed(&pool, students, year, no_scores).await,
        Commands::Clear { year, yes } => handle_clear(&pool, year, yes).await,
    }
}

async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    Ok(gradeline_db::init_db_pool(&config).await?)
}

async fn handle_seed(pool: &PgPool, students: usize, year: i32, no_scores: bool) {
    let mut config = SeedConfig::new(students).with_session_year(year);
    if no_scores {
        config = config.without_scores();
    }

    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear(pool: &PgPool, year: i32, yes: bool) {
    let session_name = SeedConfig::default().with_session_year(year).session_name();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all seeded students and session {}?",
                session_name
            ))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = seeder::clear_all(pool, &session_name).await {
        eprintln!("\n❌ Error clearing seeded data: {}", e);
        std::process::exit(1);
    }
}
