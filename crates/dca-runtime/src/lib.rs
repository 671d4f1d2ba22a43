//! Runtime orchestration layer for the DCA dashboard.
//!
//! Loads dashboard data concurrently, guards against stale responses with
//! generation tokens, and drives periodic refreshes for the TUI.

pub mod data_manager;
pub mod generation;
pub mod orchestrator;

pub use dca_core as core;
pub use dca_data as data;
