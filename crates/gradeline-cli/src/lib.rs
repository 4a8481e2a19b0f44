//! # Gradeline CLI
//!
//! Database seeding utilities for Gradeline development and testing.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use gradeline_cli::seeder::{SeedConfig, seed_all};
//!
//! let config = SeedConfig::new(20).with_session_year(2024);
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
