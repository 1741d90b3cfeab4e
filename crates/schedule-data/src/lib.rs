//! Data layer for the schedule analytics dashboard.
//!
//! Reads the uploaded workbook ([`reader`]), coerces it to the normalized
//! schema with derived fields ([`normalize`]), narrows it with row filters
//! ([`filter`]), answers the dashboard aggregates ([`queries`]), and
//! writes the normalized table back out as CSV ([`export`]).
//! [`pipeline`] ties loading and normalization together.

pub mod export;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod queries;
pub mod reader;

pub use schedule_core as core;
