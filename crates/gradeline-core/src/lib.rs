//! # Gradeline Core
//!
//! Foundational types shared by every Gradeline crate.
//!
//! - [`errors`]: Application error type and the error taxonomy used by services
//!
//! # Example
//!
//! ```ignore
//! use gradeline_core::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Academic session not found"));
//! assert_eq!(error.kind, gradeline_core::ErrorKind::NotFound);
//! ```

pub mod errors;

pub use errors::{AppError, ErrorKind};
