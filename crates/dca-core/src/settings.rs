use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::TimeRange;

/// Default client extension API prefix.
pub const DEFAULT_API_PREFIX: &str = "/satmachineclient/api/v1";

/// Default admin extension API prefix.
pub const DEFAULT_ADMIN_PREFIX: &str = "/satmachineadmin/api/v1";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Terminal dashboard for Lamassu DCA distributions
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dca-dashboard",
    about = "Terminal dashboard for Lamassu DCA distributions",
    version
)]
pub struct Settings {
    /// Base URL of the wallet server
    #[arg(long, env = "DCA_BASE_URL", default_value = "http://localhost:5000")]
    pub base_url: String,

    /// API path prefix of the client extension
    #[arg(long, env = "DCA_API_PREFIX", default_value = DEFAULT_API_PREFIX)]
    pub api_prefix: String,

    /// Wallet API key used for client endpoints
    #[arg(long, env = "DCA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API path prefix of the admin extension
    #[arg(long, env = "DCA_ADMIN_PREFIX", default_value = DEFAULT_ADMIN_PREFIX)]
    pub admin_prefix: String,

    /// Admin key used for administrative endpoints
    #[arg(long, env = "DCA_ADMIN_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "transactions", "export", "status", "register", "admin"])]
    pub view: String,

    /// Analytics time range for the accumulation chart
    #[arg(long, default_value = "30d", value_parser = ["7d", "30d", "90d", "1y", "all"])]
    pub time_range: String,

    /// Number of transactions to fetch (1-1000)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub transactions_limit: u32,

    /// Timezone for displayed dates (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Dashboard refresh rate in seconds (5-3600)
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(5..=3600))]
    pub refresh_rate: u32,

    /// Output path for the CSV export
    #[arg(long, default_value = "dca_transactions.csv")]
    pub output: PathBuf,

    /// DCA mode to register with
    #[arg(long, default_value = "flow", value_parser = ["flow", "fixed"])]
    pub dca_mode: String,

    /// Daily limit in centavos for fixed mode
    #[arg(long)]
    pub fixed_daily_limit: Option<i64>,

    /// Display name to register with
    #[arg(long)]
    pub username: Option<String>,

    /// Administrative action for the admin view
    #[arg(long, default_value = "config", value_parser = ["config", "clients", "deposits", "transactions", "test-connection", "manual-poll", "test-transaction"])]
    pub admin_action: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.dca-dashboard/last_used.json`.
///
/// API keys are never written here.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl LastUsedParams {
    /// `~/.dca-dashboard/last_used.json`
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".dca-dashboard").join("last_used.json")
    }

    /// Missing or corrupt files yield the defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Write through a sibling temp file and rename it into place.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// [`Self::load_with_last_used`] over explicit `args` and `config_path`.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // clap ids are field names, so `time_range` rather than `time-range`.
        restore(&matches, "base_url", &mut settings.base_url, last.base_url);
        restore(&matches, "api_prefix", &mut settings.api_prefix, last.api_prefix);
        restore(&matches, "view", &mut settings.view, last.view);
        restore(&matches, "timezone", &mut settings.timezone, last.timezone);
        restore(&matches, "theme", &mut settings.theme, last.theme);
        restore(
            &matches,
            "time_range",
            &mut settings.time_range,
            last.time_range.filter(|v| v.parse::<TimeRange>().is_ok()),
        );
        restore(
            &matches,
            "transactions_limit",
            &mut settings.transactions_limit,
            last.transactions_limit.filter(|v| (1..=1000).contains(v)),
        );
        restore(
            &matches,
            "refresh_rate",
            &mut settings.refresh_rate,
            last.refresh_rate.filter(|v| (5..=3600).contains(v)),
        );

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Analytics window as a typed value.
    pub fn time_range(&self) -> TimeRange {
        self.time_range.parse().unwrap_or_default()
    }

    /// `true` for views that take over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self.view.as_str(), "dashboard" | "transactions")
    }

    /// `"auto"` timezone to the system zone; `--debug` to DEBUG logging.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        // One-shot actions are not worth remembering as the next default.
        let view = s.is_interactive().then(|| s.view.clone());
        LastUsedParams {
            base_url: Some(s.base_url.clone()),
            api_prefix: Some(s.api_prefix.clone()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            time_range: Some(s.time_range.clone()),
            transactions_limit: Some(s.transactions_limit),
            refresh_rate: Some(s.refresh_rate),
            view,
        }
    }
}

// ── Merge helpers ──────────────────────────────────────────────────────────────

/// Put the saved value into `slot` unless the user gave one on the command
/// line or through the environment.
fn restore<T>(matches: &clap::ArgMatches, id: &str, slot: &mut T, saved: Option<T>) {
    if is_arg_explicitly_set(matches, id) {
        return;
    }
    if let Some(value) = saved {
        *slot = value;
    }
}

fn is_arg_explicitly_set(matches: &clap::ArgMatches, id: &str) -> bool {
    use clap::parser::ValueSource;
    matches!(
        matches.value_source(id),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
