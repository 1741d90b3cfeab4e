//! Domain core for the schedule analytics dashboard.
//!
//! Holds the normalized data model, the pure derived-field rules
//! (course-level classification, building extraction, occupancy rate),
//! the error taxonomy, CLI settings, and display formatting helpers.
//! Contains no I/O beyond settings persistence.

pub mod derive;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{Result, ScheduleError};
