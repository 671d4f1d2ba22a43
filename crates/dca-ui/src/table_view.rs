//! Transactions table for the DCA dashboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per DCA
//! distribution plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dca_core::formatting::{self, format_centavos, format_exchange_rate, format_sats};
use dca_core::models::ClientTransaction;

use crate::themes::Theme;

/// Column headings, in display order.
pub const COLUMNS: [&str; 6] = ["Date", "Sats", "Fiat", "Rate", "Type", "Status"];

/// Sums across all rows in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTotals {
    pub amount_sats: u64,
    /// Fiat total in centavos.
    pub amount_fiat: i64,
    pub count: usize,
}

impl TransactionTotals {
    pub fn from_transactions(transactions: &[ClientTransaction]) -> Self {
        transactions.iter().fold(Self::default(), |mut acc, tx| {
            acc.amount_sats = acc.amount_sats.saturating_add(tx.amount_sats);
            acc.amount_fiat = acc.amount_fiat.saturating_add(tx.amount_fiat);
            acc.count += 1;
            acc
        })
    }

    /// Sats per quetzal over the whole table, 0 when no fiat was spent.
    pub fn average_rate(&self) -> f64 {
        if self.amount_fiat <= 0 {
            0.0
        } else {
            self.amount_sats as f64 / (self.amount_fiat as f64 / 100.0)
        }
    }
}

/// Cell text for one transaction, dates shown in `timezone`.
pub fn transaction_cells(tx: &ClientTransaction, timezone: &str) -> [String; 6] {
    [
        formatting::format_date(tx.display_time(), timezone),
        format_sats(tx.amount_sats),
        format_centavos(tx.amount_fiat),
        format_exchange_rate(tx.exchange_rate),
        tx.transaction_type.clone(),
        tx.status.clone(),
    ]
}

/// Render the transactions table into `area`.
pub fn render_transactions_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    transactions: &[ClientTransaction],
    timezone: &str,
    theme: &Theme,
) {
    let header = Row::new(COLUMNS.iter().map(|h| Cell::from(*h).style(theme.table_header))).height(1);

    let mut rows: Vec<Row> = transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let [date, sats, fiat, rate, kind, status] = transaction_cells(tx, timezone);
            let status_style = theme.status_style(&status);
            Row::new(vec![
                Cell::from(date),
                Cell::from(sats).style(theme.sats),
                Cell::from(fiat),
                Cell::from(rate),
                Cell::from(kind),
                Cell::from(status).style(status_style),
            ])
            .style(style)
        })
        .collect();

    let totals = TransactionTotals::from_transactions(transactions);
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(format_sats(totals.amount_sats)),
            Cell::from(format_centavos(totals.amount_fiat)),
            Cell::from(format_exchange_rate(totals.average_rate())),
            Cell::from(format!("{} txs", totals.count)),
            Cell::from(""),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(11),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no transactions" placeholder.
pub fn render_no_transactions(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No DCA transactions yet", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Deposits are converted to sats as the ATM processes them.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" DCA Transactions "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
