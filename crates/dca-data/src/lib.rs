//! Data layer for the DCA dashboard.
//!
//! Talks to the DCA extension REST API, turns analytics history into the
//! cumulative sats series drawn by the chart, and writes CSV exports.

pub mod client;
pub mod export;
pub mod timeline;

pub use dca_core as core;
