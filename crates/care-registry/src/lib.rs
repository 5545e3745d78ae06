//! Registration, review, and directory aggregation for the care marketplace portal.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
