//! Live dashboard screen for the DCA TUI.
//!
//! Layout, top to bottom: header, summary cards, cumulative sats chart,
//! recent transactions, and a one-line status bar that doubles as the
//! notification area.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use dca_core::models::DashboardSummary;
use dca_core::time_utils::resolve_timezone;
use dca_runtime::data_manager::DashboardSnapshot;

use crate::chart_view::CumulativeChart;
use crate::components::{
    CostBasisIndicator, DeploymentBar, FiatIndicator, Header, MilestoneIndicator,
    MilestoneProgressBar, StatusIndicator,
};
use crate::table_view;
use crate::themes::Theme;

/// Severity of a status-bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Failure message for a snapshot with fetch errors, success otherwise.
    pub fn for_snapshot(snapshot: &DashboardSnapshot) -> Self {
        match snapshot.errors.as_slice() {
            [] => Self::success("Dashboard updated"),
            [only] => Self::error(only.clone()),
            [first, rest @ ..] => Self::error(format!("{first} (+{} more)", rest.len())),
        }
    }

    fn style(&self, theme: &Theme) -> ratatui::style::Style {
        match self.level {
            NotificationLevel::Info => theme.notification_info,
            NotificationLevel::Success => theme.success,
            NotificationLevel::Warning => theme.notification_warning,
            NotificationLevel::Error => theme.notification_error,
        }
    }
}

/// Everything besides the snapshot that the dashboard needs to draw.
pub struct DashboardViewContext<'a> {
    pub timezone: &'a str,
    pub theme: &'a Theme,
    pub chart: &'a CumulativeChart,
    pub notification: Option<&'a Notification>,
    /// `true` while a load for the current time range is outstanding.
    pub loading: bool,
}

/// Longest notification, in terminal columns, before it is cut short.
pub const NOTIFICATION_WIDTH: usize = 60;

/// Cut `text` to at most `max` display columns, ending in `…` when cut.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

// ── Line builders ─────────────────────────────────────────────────────────────

/// Summary card lines for `summary`.
pub fn build_summary_lines<'a>(summary: &DashboardSummary, timezone: &str, theme: &'a Theme) -> Vec<Line<'a>> {
    let milestone = MilestoneIndicator::new(summary.total_sats_accumulated, theme);
    let mut lines = vec![
        milestone.to_line(),
        MilestoneProgressBar::new(summary.total_sats_accumulated, theme).to_line(),
    ];
    if let Some(next) = milestone.next_line() {
        lines.push(next);
    }
    lines.push(Line::from(""));
    lines.push(FiatIndicator::from_summary(summary, theme).to_line());
    lines.push(
        DeploymentBar::new(summary.total_fiat_invested, summary.current_fiat_balance, theme)
            .to_line(),
    );
    lines.push(CostBasisIndicator::from_summary(summary, theme).to_line());

    let last = summary
        .last_transaction_date
        .as_deref()
        .map(|ts| dca_core::formatting::format_date(ts, timezone))
        .filter(|d| !d.is_empty());
    lines.push(
        StatusIndicator::new(summary.dca_status.clone(), summary.total_transactions, last, theme)
            .to_line(),
    );
    lines
}

/// Status bar: notification (or last update time) plus key hints.
pub fn build_status_line<'a>(
    loaded_at: Option<DateTime<Utc>>,
    notification: Option<&Notification>,
    timezone: &str,
    theme: &'a Theme,
) -> Line<'a> {
    let mut spans = Vec::with_capacity(4);

    if let Some(note) = notification {
        spans.push(Span::styled(
            truncate_to_width(&note.message, NOTIFICATION_WIDTH),
            note.style(theme),
        ));
        spans.push(Span::styled("  ", theme.dim));
    }

    if let Some(at) = loaded_at {
        let local = at.with_timezone(&resolve_timezone(timezone));
        spans.push(Span::styled(
            format!("⏰ {}", local.format("%H:%M:%S")),
            theme.info,
        ));
    }

    spans.push(Span::styled(
        "  q quit | r refresh | 1-5 range (7d 30d 90d 1y all)",
        theme.dim,
    ));
    Line::from(spans)
}

// ── Render ────────────────────────────────────────────────────────────────────

/// Render the live dashboard into `area`.
pub fn render_dashboard(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, ctx: &DashboardViewContext) {
    let theme = ctx.theme;
    let summary = snapshot.summary.clone().unwrap_or_default();
    let range_label = snapshot.time_range.label();

    let header_lines = Header::new(&summary.dca_mode, range_label, ctx.timezone, theme).to_lines();
    let summary_lines = build_summary_lines(&summary, ctx.timezone, theme);
    let table_height = (snapshot.transactions.len() as u16).saturating_add(4).min(14);

    let [header_area, summary_area, chart_area, table_area, status_area] = Layout::vertical([
        Constraint::Length(header_lines.len() as u16),
        Constraint::Length(summary_lines.len() as u16),
        Constraint::Min(0),
        Constraint::Length(table_height),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Text::from(header_lines)), header_area);
    frame.render_widget(Paragraph::new(Text::from(summary_lines)), summary_area);

    let title = if ctx.loading {
        format!("Cumulative sats · {range_label} (loading…)")
    } else {
        format!("Cumulative sats · {range_label}")
    };
    ctx.chart.render(frame, chart_area, &title, theme);

    if snapshot.transactions.is_empty() {
        table_view::render_no_transactions(frame, table_area, theme);
    } else {
        table_view::render_transactions_table(
            frame,
            table_area,
            "Recent Transactions",
            &snapshot.transactions,
            ctx.timezone,
            theme,
        );
    }

    let status = build_status_line(snapshot.loaded_at, ctx.notification, ctx.timezone, theme);
    frame.render_widget(Paragraph::new(status), status_area);
}

/// Render the waiting screen shown before the first load completes.
pub fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading DCA dashboard...", theme.info)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    let paragraph = Paragraph::new(Text::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Satmachine DCA "),
    );
    frame.render_widget(paragraph, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dca_core::models::{ClientTransaction, CumulativeSeries, SeriesPoint, TimeRange};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_summary() -> DashboardSummary {
        DashboardSummary {
            total_sats_accumulated: 123_456,
            total_fiat_invested: 100_000,
            current_fiat_balance: 25_000,
            average_cost_basis: 123.456,
            current_sats_fiat_value: 110_000,
            total_transactions: 4,
            dca_mode: "flow".to_string(),
            dca_status: "active".to_string(),
            last_transaction_date: Some("2024-03-04T18:30:00Z".to_string()),
            ..Default::default()
        }
    }

    fn make_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            generation: 1,
            time_range: TimeRange::Month,
            summary: Some(make_summary()),
            transactions: vec![ClientTransaction {
                amount_sats: 10_000,
                amount_fiat: 8_000,
                exchange_rate: 125.0,
                transaction_type: "flow".to_string(),
                status: "confirmed".to_string(),
                created_at: "2024-03-04T18:30:00Z".to_string(),
                ..Default::default()
            }],
            series: CumulativeSeries {
                points: vec![
                    SeriesPoint {
                        label: "Mar 3".to_string(),
                        value: 113_456,
                    },
                    SeriesPoint {
                        label: "Mar 4".to_string(),
                        value: 123_456,
                    },
                ],
            },
            loaded_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Notification ──────────────────────────────────────────────────────────

    #[test]
    fn test_notification_for_clean_snapshot() {
        let note = Notification::for_snapshot(&make_snapshot());
        assert_eq!(note.level, NotificationLevel::Success);
    }

    #[test]
    fn test_notification_for_failed_snapshot() {
        let mut snapshot = make_snapshot();
        snapshot.errors = vec![
            "Failed to load analytics: timeout".to_string(),
            "Failed to load transactions: timeout".to_string(),
        ];
        let note = Notification::for_snapshot(&snapshot);
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.message, "Failed to load analytics: timeout (+1 more)");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        // Wide characters count as two columns.
        assert_eq!(truncate_to_width("₿₿ 日本語テキスト", 8), "₿₿ 日本…");
    }

    // ── Lines ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_summary_lines_content() {
        let theme = Theme::dark();
        let lines = build_summary_lines(&make_summary(), "UTC", &theme);
        let all: Vec<String> = lines.iter().map(text).collect();

        assert!(all.iter().any(|l| l.contains("123,456 sats")));
        assert!(all.iter().any(|l| l.contains("Millionaire")));
        assert!(all.iter().any(|l| l.contains("Q1,000.00")));
        assert!(all.iter().any(|l| l.contains("80.0% invested")));
        assert!(all.iter().any(|l| l.contains("last: 3/4/2024")));
    }

    #[test]
    fn test_summary_lines_for_empty_summary() {
        let theme = Theme::dark();
        let lines = build_summary_lines(&DashboardSummary::default(), "UTC", &theme);
        let all: Vec<String> = lines.iter().map(text).collect();
        assert!(all.iter().any(|l| l.contains("0 sats")));
        assert!(all.iter().any(|l| l.contains("n/a")));
    }

    #[test]
    fn test_status_line_with_notification() {
        let theme = Theme::dark();
        let note = Notification::error("Failed to load summary: boom");
        let line = build_status_line(None, Some(&note), "UTC", &theme);
        assert_eq!(line.spans[0].style, theme.notification_error);
        assert!(text(&line).contains("r refresh"));
    }

    #[test]
    fn test_status_line_shows_update_time_in_timezone() {
        let theme = Theme::dark();
        let at = DateTime::parse_from_rfc3339("2024-03-05T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let line = build_status_line(Some(at), None, "America/Guatemala", &theme);
        assert!(text(&line).contains("21:04:05"), "got: {}", text(&line));
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_dashboard_does_not_panic() {
        let backend = TestBackend::new(100, 45);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let snapshot = make_snapshot();
        let chart = CumulativeChart::from_series(&snapshot.series);
        let note = Notification::for_snapshot(&snapshot);
        let ctx = DashboardViewContext {
            timezone: "UTC",
            theme: &theme,
            chart: &chart,
            notification: Some(&note),
            loading: false,
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dashboard(frame, area, &snapshot, &ctx);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("SATMACHINE DCA DASHBOARD"));
        assert!(text.contains("Recent Transactions"));
        assert!(text.contains("Dashboard updated"));
    }

    #[test]
    fn test_render_dashboard_small_terminal_skips_chart() {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let snapshot = make_snapshot();
        let chart = CumulativeChart::from_series(&snapshot.series);
        let ctx = DashboardViewContext {
            timezone: "UTC",
            theme: &theme,
            chart: &chart,
            notification: None,
            loading: true,
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dashboard(frame, area, &snapshot, &ctx);
            })
            .unwrap();
    }

    #[test]
    fn test_render_loading_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_loading(frame, area, &theme);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("Loading DCA dashboard"));
    }
}
