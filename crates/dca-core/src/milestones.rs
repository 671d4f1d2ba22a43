//! Accumulation milestones shown next to the sats total.

use crate::formatting::percentage;

/// A sats total worth celebrating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub sats: u64,
    pub emoji: &'static str,
    pub title: &'static str,
}

/// Ascending milestone ladder.
pub const MILESTONES: [Milestone; 5] = [
    Milestone {
        sats: 10_000,
        emoji: "🌱",
        title: "First sprout",
    },
    Milestone {
        sats: 100_000,
        emoji: "🌿",
        title: "Stacking",
    },
    Milestone {
        sats: 1_000_000,
        emoji: "🌳",
        title: "Millionaire (in sats)",
    },
    Milestone {
        sats: 10_000_000,
        emoji: "🚀",
        title: "Tenth of a coin",
    },
    Milestone {
        sats: 100_000_000,
        emoji: "₿",
        title: "Whole coiner",
    },
];

/// Emoji for totals that have not reached the first milestone.
pub const STARTING_EMOJI: &str = "🥚";

/// Where a sats total sits on the milestone ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneProgress {
    /// Highest milestone reached, if any.
    pub reached: Option<Milestone>,
    /// Next milestone to reach, `None` once the ladder is complete.
    pub next: Option<Milestone>,
    /// Progress from the previous milestone (or zero) to `next`, 0–100.
    pub percent: f64,
    /// Sats still needed for `next`.
    pub remaining: u64,
}

impl MilestoneProgress {
    /// Compute progress for `total_sats`.
    pub fn for_total(total_sats: u64) -> Self {
        let reached = MILESTONES.iter().rev().find(|m| total_sats >= m.sats).copied();
        let next = MILESTONES.iter().find(|m| total_sats < m.sats).copied();

        match next {
            Some(next) => {
                let floor = reached.map(|m| m.sats).unwrap_or(0);
                let span = (next.sats - floor) as f64;
                let done = (total_sats - floor) as f64;
                Self {
                    reached,
                    next: Some(next),
                    percent: percentage(done, span, 1).clamp(0.0, 100.0),
                    remaining: next.sats - total_sats,
                }
            }
            None => Self {
                reached,
                next: None,
                percent: 100.0,
                remaining: 0,
            },
        }
    }

    /// Emoji of the highest milestone reached.
    pub fn emoji(&self) -> &'static str {
        self.reached.map(|m| m.emoji).unwrap_or(STARTING_EMOJI)
    }
}
