//! Core types for the DCA dashboard.
//!
//! API models, the shared error type, display formatting, timezone helpers,
//! the accumulation milestone ladder and CLI settings.

pub mod error;
pub mod formatting;
pub mod milestones;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
