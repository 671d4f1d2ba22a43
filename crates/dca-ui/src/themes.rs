use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Guess the background from `COLORFGBG` (`"fg;bg"`): 0–6 dark, 7–15 light.
/// Defaults to dark when the variable is missing or malformed.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_sparkle: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Amounts ──────────────────────────────────────────────────────────────
    /// Sats figures.
    pub sats: Style,
    /// Positive fiat figures.
    pub fiat: Style,

    // ── Milestone progress ───────────────────────────────────────────────────
    /// Filled portion below 50 % of the way to the next milestone.
    pub progress_low: Style,
    /// Filled portion between 50 % and 80 %.
    pub progress_medium: Style,
    /// Filled portion at or above 80 %.
    pub progress_high: Style,
    /// Unfilled portion of a progress bar.
    pub progress_empty: Style,
    pub progress_label: Style,

    // ── Chart ────────────────────────────────────────────────────────────────
    pub chart_line: Style,
    /// Area under the line.
    pub chart_fill: Style,
    pub chart_axis: Style,
    pub chart_title: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,

    // ── Notifications ────────────────────────────────────────────────────────
    pub notification_info: Style,
    pub notification_warning: Style,
    pub notification_error: Style,
}

/// Base colours a [`Theme`] is derived from.
#[derive(Debug, Clone, Copy)]
struct Palette {
    /// Bitcoin orange (or nearest) for sats and the chart line.
    accent: Color,
    sparkle: Color,
    fg: Color,
    muted: Color,
    faint: Color,
    info: Color,
    /// Bars under the chart line.
    fill: Color,
    total: Color,
    /// Whether emphasised styles are bold.
    bold: bool,
}

impl Palette {
    fn plain(&self, color: Color) -> Style {
        Style::default().fg(color)
    }

    fn strong(&self, color: Color) -> Style {
        let style = Style::default().fg(color);
        if self.bold {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    fn theme(self) -> Theme {
        Theme {
            header: self.strong(self.accent),
            header_sparkle: self.plain(self.sparkle),
            separator: self.plain(self.faint),

            text: self.plain(self.fg),
            dim: self.plain(self.faint),
            bold: self.strong(self.fg),
            label: self.plain(self.muted),
            value: self.strong(self.fg),

            info: self.plain(self.info),
            success: self.plain(Color::Green),
            warning: self.plain(Color::Yellow),
            error: self.plain(Color::Red),

            sats: self.strong(self.accent),
            fiat: self.plain(Color::Green),

            progress_low: self.plain(self.info),
            progress_medium: self.plain(Color::Yellow),
            progress_high: self.plain(Color::Green),
            progress_empty: self.plain(self.faint),
            progress_label: self.plain(self.muted),

            chart_line: self.plain(self.accent),
            chart_fill: self.plain(self.fill),
            chart_axis: self.plain(self.muted),
            chart_title: self.strong(self.fg),

            table_header: self.strong(self.info),
            table_border: self.plain(self.faint),
            table_row: self.plain(self.fg),
            table_row_alt: self.plain(self.muted),
            table_total: self.strong(self.total),

            notification_info: self.plain(self.info),
            notification_warning: self.plain(Color::Yellow),
            notification_error: self.strong(Color::Red),
        }
    }
}

impl Theme {
    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Palette {
            accent: Color::Rgb(247, 147, 26),
            sparkle: Color::Yellow,
            fg: Color::White,
            muted: Color::Gray,
            faint: Color::DarkGray,
            info: Color::Cyan,
            fill: Color::Rgb(92, 58, 16),
            total: Color::Yellow,
            bold: true,
        }
        .theme()
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Palette {
            accent: Color::Rgb(196, 105, 0),
            sparkle: Color::Magenta,
            fg: Color::Black,
            muted: Color::DarkGray,
            faint: Color::Gray,
            info: Color::Blue,
            fill: Color::Rgb(250, 214, 165),
            total: Color::Magenta,
            bold: true,
        }
        .theme()
    }

    /// Basic 8-colour ANSI palette, no bold.
    pub fn classic() -> Self {
        Palette {
            accent: Color::Yellow,
            sparkle: Color::White,
            fg: Color::White,
            muted: Color::Gray,
            faint: Color::DarkGray,
            info: Color::Cyan,
            fill: Color::DarkGray,
            total: Color::Yellow,
            bold: false,
        }
        .theme()
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// `light`, `dark` or `classic`; anything else auto-detects.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Fill style for milestone progress.
    ///
    /// * `< 50 %`  → `progress_low`
    /// * `50–80 %` → `progress_medium`
    /// * `≥ 80 %`  → `progress_high`
    pub fn progress_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.progress_high
        } else if percentage >= 50.0 {
            self.progress_medium
        } else {
            self.progress_low
        }
    }

    /// Style for a fiat balance in centavos.
    pub fn balance_style(&self, centavos: i64) -> Style {
        match centavos {
            c if c < 0 => self.error,
            0 => self.dim,
            _ => self.fiat,
        }
    }

    /// Style for a client, deposit or transaction status.
    pub fn status_style(&self, status: &str) -> Style {
        match status.to_lowercase().as_str() {
            "active" | "confirmed" | "completed" => self.success,
            "pending" | "processing" => self.warning,
            "failed" | "cancelled" | "suspended" | "inactive" => self.error,
            _ => self.dim,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Rgb(247, 147, 26)));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert_eq!(t.chart_line.fg, t.sats.fg);
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
        assert_eq!(t.info.fg, Some(Color::Blue));
    }

    #[test]
    fn test_classic_theme_creation() {
        let t = Theme::classic();
        assert!(!t.bold.add_modifier.contains(Modifier::BOLD));
        assert!(!t.sats.add_modifier.contains(Modifier::BOLD));
        assert_eq!(t.table_total.fg, Some(Color::Yellow));
        assert!(!t.notification_error.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").info.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").info.fg, Some(Color::Blue));
        assert_eq!(Theme::from_name("classic").header.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    // ── progress_style thresholds ────────────────────────────────────────────

    #[test]
    fn test_progress_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.progress_style(0.0).fg, Some(Color::Cyan));
        assert_eq!(t.progress_style(49.9).fg, Some(Color::Cyan));
        assert_eq!(t.progress_style(50.0).fg, Some(Color::Yellow));
        assert_eq!(t.progress_style(79.9).fg, Some(Color::Yellow));
        assert_eq!(t.progress_style(80.0).fg, Some(Color::Green));
        assert_eq!(t.progress_style(100.0).fg, Some(Color::Green));
    }

    // ── balance_style / status_style ─────────────────────────────────────────

    #[test]
    fn test_balance_style() {
        let t = Theme::dark();
        assert_eq!(t.balance_style(-1).fg, Some(Color::Red));
        assert_eq!(t.balance_style(0).fg, Some(Color::DarkGray));
        assert_eq!(t.balance_style(10_000).fg, Some(Color::Green));
    }

    #[test]
    fn test_status_style() {
        let t = Theme::dark();
        assert_eq!(t.status_style("active").fg, Some(Color::Green));
        assert_eq!(t.status_style("Confirmed").fg, Some(Color::Green));
        assert_eq!(t.status_style("pending").fg, Some(Color::Yellow));
        assert_eq!(t.status_style("failed").fg, Some(Color::Red));
        assert_eq!(t.status_style("mystery").fg, Some(Color::DarkGray));
    }
}
