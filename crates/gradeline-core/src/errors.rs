//! Application error type.
//!
//! Services return [`AppError`], which pairs an [`ErrorKind`] with the
//! underlying [`anyhow::Error`]. Engines (ranking, rule evaluation, class
//! progression) never produce errors for business inputs; absence is modelled
//! with `Option` instead.

use anyhow::Error;
use std::fmt;
use validator::ValidationErrors;

/// Category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The system is not configured for the requested operation
    /// (e.g. no active promotion rule, session without its three terms).
    Configuration,
    /// A referenced session, term, class, student or rule does not exist.
    NotFound,
    /// Input rejected at the boundary (malformed criteria, out-of-range scores).
    Validation,
    /// The operation conflicts with existing data (overlapping sessions, duplicate names).
    Conflict,
    /// Store, cache or transaction failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn configuration<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Configuration, err)
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    /// Converts DTO validation failures into a [`ErrorKind::Validation`] error.
    pub fn invalid_input(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn into_anyhow(self) -> Error {
        self.error
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
