mod bootstrap;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use dca_core::error::DashboardError;
use dca_core::formatting::{format_centavos, format_sats};
use dca_core::models::{ClientRegistration, DcaMode};
use dca_core::settings::Settings;
use dca_core::time_utils::is_valid_timezone;
use dca_data::client::{DashboardSource, DcaApiClient};
use dca_data::export;
use dca_runtime::orchestrator::DashboardOrchestrator;
use dca_ui::app::App;

/// Page size used when exporting the full transaction history.
const EXPORT_PAGE_SIZE: u32 = 500;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = match &settings.log_file {
        Some(path) => Some(path.clone()),
        None if settings.is_interactive() => Some(bootstrap::default_log_file()),
        None => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("DCA dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Range: {}, Theme: {}, Server: {}",
        settings.view,
        settings.time_range,
        settings.theme,
        settings.base_url
    );

    if !is_valid_timezone(&settings.timezone) {
        tracing::warn!(timezone = %settings.timezone, "unknown timezone; dates will be shown in UTC");
    }

    let client = DcaApiClient::new(settings.base_url.clone(), settings.api_key.clone())?
        .with_api_prefix(settings.api_prefix.clone())
        .with_admin_prefix(settings.admin_prefix.clone())
        .with_admin_key(settings.admin_key.clone());

    match settings.view.as_str() {
        "dashboard" => run_dashboard(&settings, client).await?,
        "transactions" => run_transactions(&settings, &client).await?,
        "export" => run_export(&settings, &client).await?,
        "status" => run_status(&client).await?,
        "register" => run_register(&settings, &client).await?,
        "admin" => run_admin(&settings, &client).await?,
        unknown => bail!("Unknown view: {unknown}"),
    }

    Ok(())
}

// ── Interactive views ───────────────────────────────────────────────────────────

async fn run_dashboard(settings: &Settings, client: DcaApiClient) -> Result<()> {
    require_api_key(settings)?;
    tracing::info!("Starting live dashboard...");

    let source: Arc<dyn DashboardSource> = Arc::new(client);
    let orchestrator = DashboardOrchestrator::new(
        source,
        u64::from(settings.refresh_rate),
        settings.transactions_limit,
        settings.time_range(),
    );
    let (rx, handle) = orchestrator.start();

    let app = App::new(&settings.theme, settings.timezone.clone(), settings.time_range());

    // Raw mode delivers Ctrl+C as a key event; `key_action` maps it to quit
    // so the terminal is always restored.
    app.run_dashboard(rx, handle).await?;
    tracing::info!("Dashboard closed");
    Ok(())
}

async fn run_transactions(settings: &Settings, client: &DcaApiClient) -> Result<()> {
    require_api_key(settings)?;
    tracing::info!(limit = settings.transactions_limit, "Loading transactions table...");

    let transactions = client
        .get_transactions(&dca_data::client::TransactionQuery::latest(settings.transactions_limit))
        .await
        .context("Failed to load transactions")?;

    let app = App::new(&settings.theme, settings.timezone.clone(), settings.time_range());
    app.run_table(transactions).await?;
    Ok(())
}

// ── One-shot views ──────────────────────────────────────────────────────────────

/// Prefer the server's CSV; fall back to building it from fetched transactions.
async fn run_export(settings: &Settings, client: &DcaApiClient) -> Result<()> {
    require_api_key(settings)?;
    let path = settings.output.as_path();

    match client.export_transactions_csv().await {
        Ok(document) => {
            export::save_csv(path, &document)?;
            tracing::info!(path = %path.display(), "Saved server CSV export");
            println!("Exported transactions to {}", path.display());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Server export failed; building CSV locally");
            let transactions = client
                .get_all_transactions(EXPORT_PAGE_SIZE)
                .await
                .context("Failed to load transactions")?;
            let count = export::export_to_file(path, &transactions)?;
            println!("Exported {count} transactions to {}", path.display());
        }
    }
    Ok(())
}

async fn run_status(client: &DcaApiClient) -> Result<()> {
    let status = client
        .registration_status()
        .await
        .context("Failed to load registration status")?;

    if !status.is_registered {
        println!("Not registered for DCA. Run with --view register to sign up.");
        return Ok(());
    }

    println!("Registered for DCA");
    if let Some(id) = &status.client_id {
        println!("  Client ID: {id}");
    }
    if let Some(mode) = &status.dca_mode {
        println!("  Mode:      {mode}");
    }
    if let Some(state) = &status.status {
        println!("  Status:    {state}");
    }

    match client.get_summary().await {
        Ok(summary) => {
            println!("  Stacked:   {}", format_sats(summary.total_sats_accumulated));
            println!("  Invested:  {}", format_centavos(summary.total_fiat_invested));
            println!("  Balance:   {}", format_centavos(summary.current_fiat_balance));
        }
        Err(e) => tracing::warn!(error = %e, "Failed to load summary"),
    }
    Ok(())
}

async fn run_register(settings: &Settings, client: &DcaApiClient) -> Result<()> {
    let registration = registration_from_settings(settings)?;

    match client.register(&registration).await {
        Ok(response) => {
            println!("Registered for DCA in {} mode", settings.dca_mode);
            print_json(&response)?;
        }
        Err(DashboardError::AlreadyRegistered(detail)) => {
            println!("Already registered for DCA: {detail}");
        }
        Err(e) => return Err(e).context("Registration failed"),
    }
    Ok(())
}

async fn run_admin(settings: &Settings, client: &DcaApiClient) -> Result<()> {
    if settings.admin_key.as_deref().map_or(true, str::is_empty) {
        bail!("--admin-key (or DCA_ADMIN_KEY) is required for admin actions");
    }

    let action = settings.admin_action.as_str();
    tracing::info!(action, "Running admin action");

    match action {
        "config" => print_json(&client.get_lamassu_config().await?)?,
        "clients" => print_json(&client.list_clients().await?)?,
        "deposits" => print_json(&client.list_deposits().await?)?,
        "transactions" => print_json(&client.list_payments().await?)?,
        "test-connection" => print_json(&client.test_connection().await?)?,
        "manual-poll" => print_json(&client.manual_poll().await?)?,
        "test-transaction" => print_json(&client.test_transaction().await?)?,
        other => bail!("Unknown admin action: {other}"),
    }
    Ok(())
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn require_api_key(settings: &Settings) -> Result<()> {
    if settings.api_key.as_deref().map_or(true, str::is_empty) {
        bail!("--api-key (or DCA_API_KEY) is required for the {} view", settings.view);
    }
    Ok(())
}

/// Registration body from `--dca-mode`, `--fixed-daily-limit` and `--username`.
fn registration_from_settings(settings: &Settings) -> Result<ClientRegistration> {
    let dca_mode: DcaMode = settings.dca_mode.parse()?;
    let fixed_mode_daily_limit = match (dca_mode, settings.fixed_daily_limit) {
        (DcaMode::Fixed, None) => bail!("--fixed-daily-limit is required in fixed mode"),
        (DcaMode::Fixed, Some(limit)) if limit <= 0 => {
            bail!("--fixed-daily-limit must be positive, got {limit}")
        }
        (DcaMode::Fixed, limit) => limit,
        (DcaMode::Flow, _) => None,
    };

    Ok(ClientRegistration {
        dca_mode,
        fixed_mode_daily_limit,
        username: settings.username.clone(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
