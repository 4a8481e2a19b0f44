//! Academic sessions module.
//!
//! Sessions (school years) and their three terms: creation with the fixed term
//! calendar, deletion guards, derived statuses and the "current" state machine.

pub mod schedule;
pub mod service;
pub mod state_machine;

pub use service::AcademicSessionService;
pub use state_machine::{Schedulable, TermStateMachine, Transition, TransitionReport};
