//! Terminal UI layer for the DCA dashboard.
//!
//! Provides themes, summary components, the cumulative sats chart, the
//! transactions table, the live dashboard view, and the application event
//! loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use dca_core as core;
