//! Reusable line-level widgets shared by the dashboard and table views.

pub mod header;
pub mod indicators;
pub mod progress_bar;

pub use header::Header;
pub use indicators::{CostBasisIndicator, FiatIndicator, MilestoneIndicator, StatusIndicator};
pub use progress_bar::{DeploymentBar, MilestoneProgressBar, ProgressBarConfig};
