//! Cumulative sats chart.
//!
//! [`CumulativeChart`] is an owned value built from the latest
//! [`CumulativeSeries`] and replaced whole whenever a new snapshot arrives.
//! Rendering borrows it for a single frame. When the target area is too
//! small the chart is skipped for that frame and a placeholder is drawn
//! instead; the next frame checks again.

use ratatui::{
    layout::{Alignment, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use dca_core::formatting::format_number;
use dca_core::models::CumulativeSeries;

use crate::themes::Theme;

/// Smallest area the chart will draw into (including its border).
pub const MIN_CHART_WIDTH: u16 = 30;
pub const MIN_CHART_HEIGHT: u16 = 8;

/// Plot-ready copy of a [`CumulativeSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeChart {
    /// `(index, cumulative sats)` pairs.
    points: Vec<(f64, f64)>,
    labels: Vec<String>,
    max_value: u64,
    placeholder: bool,
}

impl Default for CumulativeChart {
    fn default() -> Self {
        Self::from_series(&CumulativeSeries::placeholder())
    }
}

impl CumulativeChart {
    pub fn from_series(series: &CumulativeSeries) -> Self {
        let points = series
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.value as f64))
            .collect();

        Self {
            points,
            labels: series.labels(),
            max_value: series.points.iter().map(|p| p.value).max().unwrap_or(0),
            placeholder: series.is_placeholder(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// `true` if `area` is large enough to hold the chart.
    pub fn fits(area: Rect) -> bool {
        area.width >= MIN_CHART_WIDTH && area.height >= MIN_CHART_HEIGHT
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.points.len().saturating_sub(1)).max(1) as f64]
    }

    /// Zero to 10 % above the highest value, never a zero-height range.
    pub fn y_bounds(&self) -> [f64; 2] {
        let top = (self.max_value as f64 * 1.1).max(1.0);
        [0.0, top]
    }

    /// First, middle and last date labels; fewer when the series is short.
    pub fn x_labels(&self) -> Vec<String> {
        match self.labels.len() {
            0 => Vec::new(),
            1 => vec![self.labels[0].clone()],
            2 => self.labels.clone(),
            n => vec![
                self.labels[0].clone(),
                self.labels[n / 2].clone(),
                self.labels[n - 1].clone(),
            ],
        }
    }

    pub fn y_labels(&self) -> Vec<String> {
        let [_, top] = self.y_bounds();
        vec![
            "0".to_string(),
            format_number(top / 2.0, 0),
            format_number(top, 0),
        ]
    }

    /// Draw the chart into `area`, or the size placeholder if it does not fit.
    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(Span::styled(format!(" {title} "), theme.chart_title));

        if !Self::fits(area) {
            tracing::trace!(width = area.width, height = area.height, "chart area too small");
            render_chart_placeholder(frame, area, "Enlarge the terminal to see the chart", theme);
            return;
        }

        // Bars under the line stand in for a gradient fill.
        let datasets = vec![
            Dataset::default()
                .marker(Marker::HalfBlock)
                .graph_type(GraphType::Bar)
                .style(theme.chart_fill)
                .data(&self.points),
            Dataset::default()
                .name("Total sats")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.chart_line)
                .data(&self.points),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(theme.chart_axis)
                    .bounds(self.x_bounds())
                    .labels(self.x_labels()),
            )
            .y_axis(
                Axis::default()
                    .title("sats")
                    .style(theme.chart_axis)
                    .bounds(self.y_bounds())
                    .labels(self.y_labels()),
            );

        frame.render_widget(chart, area);

        if self.placeholder {
            let hint = Paragraph::new(Line::from(Span::styled(
                CumulativeSeries::PLACEHOLDER_LABEL,
                theme.info,
            )))
            .alignment(Alignment::Center);
            let inner = Rect {
                x: area.x,
                y: area.y + area.height / 2,
                width: area.width,
                height: 1,
            };
            frame.render_widget(hint, inner);
        }
    }
}

/// Bordered one-line message drawn where the chart would go.
pub fn render_chart_placeholder(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let paragraph = Paragraph::new(Line::from(Span::styled(message.to_string(), theme.dim)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(theme.table_border));
    frame.render_widget(paragraph, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dca_core::models::SeriesPoint;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn series(values: &[(&str, u64)]) -> CumulativeSeries {
        CumulativeSeries {
            points: values
                .iter()
                .map(|(label, value)| SeriesPoint {
                    label: label.to_string(),
                    value: *value,
                })
                .collect(),
        }
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

    #[test]
    fn test_from_series_points_and_bounds() {
        let chart = CumulativeChart::from_series(&series(&[
            ("Jan 1", 100),
            ("Jan 2", 150),
            ("Jan 3", 400),
        ]));
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.points()[2], (2.0, 400.0));
        assert_eq!(chart.x_bounds(), [0.0, 2.0]);
        assert!((chart.y_bounds()[1] - 440.0).abs() < 1e-9);
        assert!(!chart.is_placeholder());
    }

    #[test]
    fn test_placeholder_chart() {
        let chart = CumulativeChart::default();
        assert!(chart.is_placeholder());
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.x_bounds(), [0.0, 1.0]);
        assert_eq!(chart.y_bounds(), [0.0, 1.0]);
        assert_eq!(chart.x_labels(), vec![CumulativeSeries::PLACEHOLDER_LABEL]);
    }

    #[test]
    fn test_x_labels_first_middle_last() {
        let chart = CumulativeChart::from_series(&series(&[
            ("Jan 1", 1),
            ("Jan 2", 2),
            ("Jan 3", 3),
            ("Jan 4", 4),
            ("Jan 5", 5),
        ]));
        assert_eq!(chart.x_labels(), vec!["Jan 1", "Jan 3", "Jan 5"]);
    }

    #[test]
    fn test_y_labels_are_grouped() {
        let chart = CumulativeChart::from_series(&series(&[("Jan 1", 1_000_000)]));
        assert_eq!(chart.y_labels(), vec!["0", "550,000", "1,100,000"]);
    }

    #[test]
    fn test_rebuilt_chart_replaces_previous() {
        let mut chart = CumulativeChart::default();
        assert!(chart.is_placeholder());
        chart = CumulativeChart::from_series(&series(&[("Jan 1", 5), ("Jan 2", 9)]));
        assert_eq!(chart.len(), 2);
        assert!(!chart.is_placeholder());
    }

    #[test]
    fn test_fits() {
        assert!(CumulativeChart::fits(Rect::new(0, 0, 80, 20)));
        assert!(!CumulativeChart::fits(Rect::new(0, 0, 20, 20)));
        assert!(!CumulativeChart::fits(Rect::new(0, 0, 80, 5)));
    }

    #[test]
    fn test_render_chart_does_not_panic() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let chart = CumulativeChart::from_series(&series(&[("Jan 1", 100), ("Jan 2", 150)]));

        terminal
            .draw(|frame| {
                let area = frame.area();
                chart.render(frame, area, "Cumulative sats", &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Cumulative sats"));
        assert!(text.contains("Jan 1"));
    }

    #[test]
    fn test_render_too_small_draws_placeholder() {
        let backend = TestBackend::new(60, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let chart = CumulativeChart::from_series(&series(&[("Jan 1", 100)]));

        terminal
            .draw(|frame| {
                let area = frame.area();
                chart.render(frame, area, "Cumulative sats", &theme);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("Enlarge the terminal"));
    }

    #[test]
    fn test_render_placeholder_series_shows_hint() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let chart = CumulativeChart::default();

        terminal
            .draw(|frame| {
                let area = frame.area();
                chart.render(frame, area, "Cumulative sats", &theme);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("Start Your DCA Journey"));
    }
}
