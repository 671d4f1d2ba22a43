use crate::themes::Theme;
use dca_core::formatting::{format_centavos, format_number};
use dca_core::milestones::MilestoneProgress;
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

impl ProgressBarConfig {
    /// Filled and empty segments for `percentage` (clamped to 0–100).
    fn segments(&self, percentage: f64) -> (String, String) {
        let pct = percentage.clamp(0.0, 100.0);
        let filled = ((pct / 100.0) * self.width as f64) as u16;
        let empty = self.width.saturating_sub(filled);
        (
            self.filled_char.to_string().repeat(filled as usize),
            self.empty_char.to_string().repeat(empty as usize),
        )
    }
}

// ── MilestoneProgressBar ─────────────────────────────────────────────────────

/// Progress from the last milestone reached toward the next one.
pub struct MilestoneProgressBar<'a> {
    pub progress: MilestoneProgress,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> MilestoneProgressBar<'a> {
    pub fn new(total_sats: u64, theme: &'a Theme) -> Self {
        Self {
            progress: MilestoneProgress::for_total(total_sats),
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    /// Bar followed by `" 45.0% → 🌳 1,000,000 sats"`, or a completion note
    /// once the last milestone is reached.
    pub fn to_line(&self) -> Line<'a> {
        let pct = self.progress.percent;
        let (filled, empty) = self.config.segments(pct);

        let label = match self.progress.next {
            Some(next) => format!(
                " {:.1}% → {} {} sats",
                pct,
                next.emoji,
                format_number(next.sats as f64, 0)
            ),
            None => " all milestones reached".to_string(),
        };

        Line::from(vec![
            Span::styled(filled, self.theme.progress_style(pct)),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled(label, self.theme.progress_label),
        ])
    }
}

// ── DeploymentBar ────────────────────────────────────────────────────────────

/// Share of deposited fiat that has already been converted to sats.
///
/// Deposits are `invested + remaining balance`, all in centavos.
pub struct DeploymentBar<'a> {
    pub invested: i64,
    pub balance: i64,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> DeploymentBar<'a> {
    pub fn new(invested: i64, balance: i64, theme: &'a Theme) -> Self {
        Self {
            invested,
            balance,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    /// Percentage of deposits already invested, 0 when nothing was deposited.
    pub fn percentage(&self) -> f64 {
        let invested = self.invested.max(0) as f64;
        let deposited = invested + self.balance.max(0) as f64;
        if deposited <= 0.0 {
            0.0
        } else {
            (invested / deposited * 100.0).min(100.0)
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let pct = self.percentage();
        let (filled, empty) = self.config.segments(pct);
        let label = format!(
            " {:.1}% invested ({} left)",
            pct,
            format_centavos(self.balance)
        );

        Line::from(vec![
            Span::styled(filled, self.theme.fiat),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled(label, self.theme.progress_label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
