use crate::themes::Theme;
use dca_core::formatting::{format_btc, format_centavos, format_exchange_rate, format_sats};
use dca_core::milestones::MilestoneProgress;
use dca_core::models::DashboardSummary;
use ratatui::text::{Line, Span};

// ── MilestoneIndicator ───────────────────────────────────────────────────────

/// Shows the sats total with the emoji of the highest milestone reached.
///
/// | Total sats   | Emoji |
/// |--------------|-------|
/// | ≥ 100 000 000 | ₿    |
/// | ≥ 10 000 000 | 🚀    |
/// | ≥ 1 000 000  | 🌳    |
/// | ≥ 100 000    | 🌿    |
/// | ≥ 10 000     | 🌱    |
/// | < 10 000     | 🥚    |
pub struct MilestoneIndicator<'a> {
    pub total_sats: u64,
    pub theme: &'a Theme,
}

impl<'a> MilestoneIndicator<'a> {
    pub fn new(total_sats: u64, theme: &'a Theme) -> Self {
        Self { total_sats, theme }
    }

    pub fn emoji(&self) -> &'static str {
        MilestoneProgress::for_total(self.total_sats).emoji()
    }

    /// Format: `"🌿 Stacked: 123,456 sats (0.00123456 BTC)"`
    pub fn to_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::raw(self.emoji()),
            Span::styled(" Stacked: ", self.theme.label),
            Span::styled(format_sats(self.total_sats), self.theme.sats),
            Span::styled(format!(" ({})", format_btc(self.total_sats)), self.theme.dim),
        ])
    }

    /// `"Next: 🌳 Millionaire (in sats), 876,544 sats to go"`, or `None` when
    /// the ladder is complete.
    pub fn next_line(&self) -> Option<Line<'a>> {
        let progress = MilestoneProgress::for_total(self.total_sats);
        let next = progress.next?;
        Some(Line::from(vec![
            Span::styled("Next: ", self.theme.label),
            Span::raw(next.emoji),
            Span::styled(format!(" {}", next.title), self.theme.value),
            Span::styled(
                format!(", {} to go", format_sats(progress.remaining)),
                self.theme.dim,
            ),
        ]))
    }
}

// ── FiatIndicator ────────────────────────────────────────────────────────────

/// Invested fiat, remaining balance and pending deposits.
pub struct FiatIndicator<'a> {
    pub invested: i64,
    pub balance: i64,
    pub pending: i64,
    pub theme: &'a Theme,
}

impl<'a> FiatIndicator<'a> {
    pub fn from_summary(summary: &DashboardSummary, theme: &'a Theme) -> Self {
        Self {
            invested: summary.total_fiat_invested,
            balance: summary.current_fiat_balance,
            pending: summary.pending_fiat_deposits,
            theme,
        }
    }

    /// Format: `"💰 Invested: Q1,234.56 | Balance: Q100.00"` with a trailing
    /// `" | Pending: Q50.00"` span when deposits await confirmation.
    pub fn to_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("💰 Invested: ", self.theme.label),
            Span::styled(format_centavos(self.invested), self.theme.fiat),
            Span::styled(" | Balance: ", self.theme.label),
            Span::styled(
                format_centavos(self.balance),
                self.theme.balance_style(self.balance),
            ),
        ];

        if self.pending > 0 {
            spans.push(Span::styled(
                format!(" | Pending: {}", format_centavos(self.pending)),
                self.theme.warning,
            ));
        }

        Line::from(spans)
    }
}

// ── CostBasisIndicator ───────────────────────────────────────────────────────

/// Average cost basis in sats per quetzal, plus the current value of the stack.
pub struct CostBasisIndicator<'a> {
    pub average_cost_basis: f64,
    pub current_value: i64,
    pub theme: &'a Theme,
}

impl<'a> CostBasisIndicator<'a> {
    pub fn from_summary(summary: &DashboardSummary, theme: &'a Theme) -> Self {
        Self {
            average_cost_basis: summary.average_cost_basis,
            current_value: summary.current_sats_fiat_value,
            theme,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let basis = if self.average_cost_basis > 0.0 {
            format_exchange_rate(self.average_cost_basis)
        } else {
            "n/a".to_string()
        };

        Line::from(vec![
            Span::styled("📊 Avg cost basis: ", self.theme.label),
            Span::styled(basis, self.theme.value),
            Span::styled(" | Value: ", self.theme.label),
            Span::styled(format_centavos(self.current_value), self.theme.fiat),
        ])
    }
}

// ── StatusIndicator ──────────────────────────────────────────────────────────

/// Client status, transaction count and last transaction date.
pub struct StatusIndicator<'a> {
    pub status: String,
    pub total_transactions: u64,
    pub last_transaction: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> StatusIndicator<'a> {
    pub fn new(
        status: impl Into<String>,
        total_transactions: u64,
        last_transaction: Option<String>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            status: status.into(),
            total_transactions,
            last_transaction,
            theme,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let status = if self.status.is_empty() {
            "unknown"
        } else {
            self.status.as_str()
        };

        let mut spans = vec![
            Span::styled("⚙️  Status: ", self.theme.label),
            Span::styled(status.to_string(), self.theme.status_style(status)),
            Span::styled(
                format!(" | {} transactions", self.total_transactions),
                self.theme.dim,
            ),
        ];
        if let Some(last) = &self.last_transaction {
            spans.push(Span::styled(format!(" | last: {last}"), self.theme.dim));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    // ── MilestoneIndicator ───────────────────────────────────────────────────

    #[test]
    fn test_milestone_emoji_tiers() {
        let theme = Theme::dark();
        assert_eq!(MilestoneIndicator::new(0, &theme).emoji(), "🥚");
        assert_eq!(MilestoneIndicator::new(9_999, &theme).emoji(), "🥚");
        assert_eq!(MilestoneIndicator::new(10_000, &theme).emoji(), "🌱");
        assert_eq!(MilestoneIndicator::new(250_000, &theme).emoji(), "🌿");
        assert_eq!(MilestoneIndicator::new(1_000_000, &theme).emoji(), "🌳");
        assert_eq!(MilestoneIndicator::new(100_000_000, &theme).emoji(), "₿");
    }

    #[test]
    fn test_milestone_to_line_content() {
        let theme = Theme::dark();
        let line = MilestoneIndicator::new(123_456, &theme).to_line();
        assert_eq!(line.spans.len(), 4);
        let full = text(&line);
        assert!(full.contains("123,456 sats"), "unexpected content: {full}");
        assert!(full.contains("0.00123456 BTC"), "unexpected content: {full}");
        assert_eq!(line.spans[2].style, theme.sats);
    }

    #[test]
    fn test_milestone_next_line() {
        let theme = Theme::dark();
        let line = MilestoneIndicator::new(123_456, &theme)
            .next_line()
            .expect("next milestone");
        let full = text(&line);
        assert!(full.contains("Millionaire"), "unexpected content: {full}");
        assert!(full.contains("876,544 sats to go"), "unexpected content: {full}");

        assert!(MilestoneIndicator::new(200_000_000, &theme)
            .next_line()
            .is_none());
    }

    // ── FiatIndicator ────────────────────────────────────────────────────────

    #[test]
    fn test_fiat_indicator_without_pending() {
        let theme = Theme::dark();
        let summary = DashboardSummary {
            total_fiat_invested: 123_456,
            current_fiat_balance: 10_000,
            ..Default::default()
        };
        let line = FiatIndicator::from_summary(&summary, &theme).to_line();
        assert_eq!(line.spans.len(), 4);
        let full = text(&line);
        assert!(full.contains("Q1,234.56"), "unexpected content: {full}");
        assert!(full.contains("Q100.00"), "unexpected content: {full}");
    }

    #[test]
    fn test_fiat_indicator_with_pending() {
        let theme = Theme::dark();
        let summary = DashboardSummary {
            pending_fiat_deposits: 5_000,
            ..Default::default()
        };
        let line = FiatIndicator::from_summary(&summary, &theme).to_line();
        assert_eq!(line.spans.len(), 5);
        assert!(text(&line).contains("Pending: Q50.00"));
    }

    #[test]
    fn test_fiat_indicator_negative_balance_uses_error_style() {
        let theme = Theme::dark();
        let summary = DashboardSummary {
            current_fiat_balance: -500,
            ..Default::default()
        };
        let line = FiatIndicator::from_summary(&summary, &theme).to_line();
        assert_eq!(line.spans[3].style, theme.error);
    }

    // ── CostBasisIndicator ───────────────────────────────────────────────────

    #[test]
    fn test_cost_basis_indicator() {
        let theme = Theme::dark();
        let summary = DashboardSummary {
            average_cost_basis: 1_234.5,
            current_sats_fiat_value: 99_900,
            ..Default::default()
        };
        let full = text(&CostBasisIndicator::from_summary(&summary, &theme).to_line());
        assert!(full.contains("1,234.50 sats/Q"), "unexpected content: {full}");
        assert!(full.contains("Q999.00"), "unexpected content: {full}");
    }

    #[test]
    fn test_cost_basis_zero_shows_na() {
        let theme = Theme::dark();
        let summary = DashboardSummary::default();
        let full = text(&CostBasisIndicator::from_summary(&summary, &theme).to_line());
        assert!(full.contains("n/a"), "unexpected content: {full}");
    }

    // ── StatusIndicator ──────────────────────────────────────────────────────

    #[test]
    fn test_status_indicator() {
        let theme = Theme::dark();
        let line = StatusIndicator::new("active", 12, Some("3/4/2024".into()), &theme).to_line();
        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[1].style, theme.success);
        let full = text(&line);
        assert!(full.contains("12 transactions"), "unexpected content: {full}");
        assert!(full.contains("last: 3/4/2024"), "unexpected content: {full}");
    }

    #[test]
    fn test_status_indicator_empty_status() {
        let theme = Theme::dark();
        let line = StatusIndicator::new("", 0, None, &theme).to_line();
        assert_eq!(line.spans.len(), 3);
        assert!(text(&line).contains("unknown"));
    }
}
