use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative string placed either side of the application title.
pub const SPARKLES: &str = "₿ ✧ ₿ ✧";

/// Dashboard header rendering four lines:
///
/// 1. Application title with decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. DCA mode, time range and timezone in `[ mode | range | timezone ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// DCA mode reported by the server (`flow`, `fixed`), may be empty.
    pub dca_mode: &'a str,
    /// Human-readable analytics window, e.g. `"30 days"`.
    pub time_range: &'a str,
    /// Display timezone name.
    pub timezone: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(dca_mode: &'a str, time_range: &'a str, timezone: &'a str, theme: &'a Theme) -> Self {
        Self {
            dca_mode,
            time_range,
            timezone,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let mode = if self.dca_mode.is_empty() {
            "unregistered".to_string()
        } else {
            self.dca_mode.to_lowercase()
        };

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header_sparkle),
                Span::styled(" SATMACHINE DCA DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header_sparkle),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(mode, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.time_range, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_lowercase(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
