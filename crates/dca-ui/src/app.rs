//! Main application state and TUI event loop for the DCA dashboard.
//!
//! [`App`] owns the theme, the display timezone, the latest dashboard
//! snapshot and the chart built from it. It drives both the live dashboard
//! and the static transactions table event loops.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;

use dca_core::models::{ClientTransaction, TimeRange};
use dca_runtime::data_manager::DashboardSnapshot;
use dca_runtime::orchestrator::{DashboardCommand, DashboardHandle};

use crate::chart_view::CumulativeChart;
use crate::dashboard_view::{self, DashboardViewContext, Notification};
use crate::table_view;
use crate::themes::Theme;

/// How long each frame waits for a key press.
const TICK_RATE: Duration = Duration::from_millis(250);

// ── KeyAction ─────────────────────────────────────────────────────────────────

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Command(DashboardCommand),
    Ignore,
}

/// Map a key to an action. Digits `1`-`5` select [`TimeRange::ALL`] in order.
pub fn key_action(key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Command(DashboardCommand::Refresh),
        KeyCode::Char(c @ '1'..='5') => {
            let index = (c as u8 - b'1') as usize;
            KeyAction::Command(DashboardCommand::SetTimeRange(TimeRange::ALL[index]))
        }
        _ => KeyAction::Ignore,
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the DCA dashboard TUI.
pub struct App {
    pub theme: Theme,
    /// Display timezone name.
    pub timezone: String,
    /// Analytics window currently requested.
    pub time_range: TimeRange,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent snapshot, `None` until the first load completes.
    pub snapshot: Option<DashboardSnapshot>,
    /// Rebuilt whole from each snapshot's series.
    pub chart: CumulativeChart,
    pub notification: Option<Notification>,
}

impl App {
    pub fn new(theme_name: &str, timezone: String, time_range: TimeRange) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            timezone,
            time_range,
            should_quit: false,
            snapshot: None,
            chart: CumulativeChart::default(),
            notification: None,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the live dashboard, receiving snapshots from `rx` and sending
    /// commands through `handle`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so that the
    /// terminal event loop stays on the current thread while snapshots
    /// arrive on the async channel via `try_recv`.
    pub async fn run_dashboard(
        mut self,
        mut rx: mpsc::Receiver<DashboardSnapshot>,
        handle: DashboardHandle,
    ) -> io::Result<()> {
        let mut terminal = enter_terminal()?;

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    match key_action(key) {
                        KeyAction::Quit => break Ok(()),
                        KeyAction::Command(command) => self.dispatch(command, &handle),
                        KeyAction::Ignore => {}
                    }
                }
            }

            // Drain any pending snapshots (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(snapshot) => self.apply_snapshot(snapshot),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        tracing::warn!("dashboard loader stopped");
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        handle.abort();
        leave_terminal(&mut terminal)?;
        result
    }

    /// Run the static transactions table, then wait for `q` / `Ctrl+C`.
    pub async fn run_table(self, transactions: Vec<ClientTransaction>) -> io::Result<()> {
        let mut terminal = enter_terminal()?;

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                if transactions.is_empty() {
                    table_view::render_no_transactions(frame, area, &self.theme);
                } else {
                    table_view::render_transactions_table(
                        frame,
                        area,
                        "DCA Transactions",
                        &transactions,
                        &self.timezone,
                        &self.theme,
                    );
                }
            })?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key_action(key) == KeyAction::Quit {
                        break;
                    }
                }
            }
        }

        leave_terminal(&mut terminal)
    }

    // ── State updates ─────────────────────────────────────────────────────────

    /// Store `snapshot` and rebuild the chart from its series.
    pub fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) {
        tracing::debug!(
            generation = snapshot.generation,
            range = %snapshot.time_range,
            points = snapshot.series.len(),
            errors = snapshot.errors.len(),
            "applying dashboard snapshot"
        );
        self.chart = CumulativeChart::from_series(&snapshot.series);
        self.notification = Some(Notification::for_snapshot(&snapshot));
        self.snapshot = Some(snapshot);
    }

    /// `true` while the shown data is for a different range than requested.
    pub fn is_loading(&self) -> bool {
        self.snapshot
            .as_ref()
            .map(|s| s.time_range != self.time_range)
            .unwrap_or(true)
    }

    fn dispatch(&mut self, command: DashboardCommand, handle: &DashboardHandle) {
        match command {
            DashboardCommand::Refresh => {
                self.notification = Some(Notification::info("Refreshing..."));
            }
            DashboardCommand::SetTimeRange(range) => {
                self.time_range = range;
                self.notification = Some(Notification::info(format!("Loading {}...", range.label())));
            }
        }
        if !handle.send(command) {
            self.notification = Some(Notification::warning("Dashboard is busy, try again"));
        }
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.snapshot {
            Some(snapshot) => {
                let ctx = DashboardViewContext {
                    timezone: &self.timezone,
                    theme: &self.theme,
                    chart: &self.chart,
                    notification: self.notification.as_ref(),
                    loading: self.is_loading(),
                };
                dashboard_view::render_dashboard(frame, area, snapshot, &ctx);
            }
            None => dashboard_view::render_loading(frame, area, &self.theme),
        }
    }
}

// ── Terminal setup ────────────────────────────────────────────────────────────

fn enter_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
