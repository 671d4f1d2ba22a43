use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::DashboardError;

// ── Lenient numeric decoding ──────────────────────────────────────────────────

/// Decode a non-negative integer from whatever the server sent.
///
/// Integers pass through, floats are truncated, numeric strings are parsed.
/// Negative, `null`, boolean and otherwise malformed values become `0`.
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value))
}

/// Decode a signed integer (fiat balances may go negative).
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).map(|f| f as i64).unwrap_or(0))
}

/// Decode a float, falling back to `0.0`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

/// Decode a string that may arrive as `null` or a number.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Decode a list, dropping elements that do not decode as `T`.
///
/// `null` or a non-array value becomes an empty list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => lenient_items(items),
        Value::Null => Vec::new(),
        other => {
            debug!(found = %other, "expected a list; using an empty one");
            Vec::new()
        }
    })
}

/// Decode each element of `items` as `T`, skipping the ones that fail.
pub fn lenient_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        debug!(kept = decoded.len(), total, "dropped malformed records");
    }
    decoded
}

/// Decode a nested object, falling back to its default when malformed.
pub fn lenient_struct<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn value_to_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn value_to_u64(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value_to_f64(value) {
        Some(f) if f > 0.0 => f as u64,
        _ => 0,
    }
}

// ── Timeline records ──────────────────────────────────────────────────────────

/// Sats accumulated on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Calendar date, usually `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sats: u64,
    /// Fiat spent that day, in centavos.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub fiat: i64,
    /// Number of confirmed distributions that day.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub transactions: u64,
}

impl TimelinePoint {
    pub fn new(date: impl Into<String>, sats: u64) -> Self {
        Self {
            date: date.into(),
            sats,
            fiat: 0,
            transactions: 0,
        }
    }
}

/// Already-cumulative snapshot of holdings after one distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBasisPoint {
    /// Timestamp, possibly ISO 8601 with a time component.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cumulative_sats: u64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub cumulative_fiat: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_cost_basis: f64,
}

impl CostBasisPoint {
    pub fn new(date: impl Into<String>, cumulative_sats: u64) -> Self {
        Self {
            date: date.into(),
            cumulative_sats,
            cumulative_fiat: 0,
            average_cost_basis: 0.0,
        }
    }
}

// ── CumulativeSeries ──────────────────────────────────────────────────────────

/// One plotted point: a short date label and the running sats total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Ascending, non-decreasing series of cumulative sats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub points: Vec<SeriesPoint>,
}

impl CumulativeSeries {
    /// Label shown when there is no history at all.
    pub const PLACEHOLDER_LABEL: &'static str = "Start Your DCA Journey";

    /// Single-point series used when no data is available.
    pub fn placeholder() -> Self {
        Self {
            points: vec![SeriesPoint {
                label: Self::PLACEHOLDER_LABEL.to_string(),
                value: 0,
            }],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.points.len() == 1 && self.points[0].label == Self::PLACEHOLDER_LABEL
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Chart labels, same length as [`Self::values`].
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    /// Chart values, same length as [`Self::labels`].
    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value of the last point, or 0.
    pub fn latest(&self) -> u64 {
        self.points.last().map(|p| p.value).unwrap_or(0)
    }
}

// ── Dashboard responses ───────────────────────────────────────────────────────

fn default_currency() -> String {
    "GTQ".to_string()
}

/// `GET /dashboard/summary`. Fiat amounts are in centavos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_sats_accumulated: u64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_fiat_invested: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pending_fiat_deposits: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub current_sats_fiat_value: i64,
    /// Sats per unit of fiat spent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_cost_basis: f64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub current_fiat_balance: i64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_transactions: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dca_mode: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dca_status: String,
    #[serde(default)]
    pub last_transaction_date: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// One DCA distribution as listed by `GET /dashboard/transactions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientTransaction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub amount_sats: u64,
    /// Fiat amount in centavos.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub amount_fiat: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub exchange_rate: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub lamassu_transaction_id: Option<String>,
}

impl ClientTransaction {
    /// ATM transaction time when known, otherwise the record creation time.
    pub fn display_time(&self) -> &str {
        match self.transaction_time.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.created_at,
        }
    }
}

/// Frequency metrics attached to the analytics response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFrequency {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_transactions: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_sats_per_transaction: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_fiat_per_transaction: f64,
    #[serde(default)]
    pub first_transaction: Option<String>,
    #[serde(default)]
    pub last_transaction: Option<String>,
}

/// `GET /dashboard/analytics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientAnalytics {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub cost_basis_history: Vec<CostBasisPoint>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub accumulation_timeline: Vec<TimelinePoint>,
    #[serde(default, deserialize_with = "lenient_struct")]
    pub transaction_frequency: TransactionFrequency,
}

// ── Registration ──────────────────────────────────────────────────────────────

/// `GET /registration-status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationStatus {
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub dca_mode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// How a client receives distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DcaMode {
    /// Proportional share of every ATM transaction.
    Flow,
    /// Fixed daily amount up to a limit.
    Fixed,
}

impl std::str::FromStr for DcaMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flow" => Ok(DcaMode::Flow),
            "fixed" => Ok(DcaMode::Fixed),
            other => Err(DashboardError::Config(format!("unknown DCA mode: {other}"))),
        }
    }
}

/// `POST /register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub dca_mode: DcaMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_mode_daily_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `PUT /dashboard/settings` body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dca_mode: Option<DcaMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_mode_daily_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── Admin records ─────────────────────────────────────────────────────────────

fn default_pg_port() -> u16 {
    5432
}

fn default_ssh_port() -> u16 {
    22
}

/// Lamassu database connection settings as stored by the admin extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LamassuConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "lenient_string")]
    pub database_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub test_connection_last: Option<String>,
    #[serde(default)]
    pub test_connection_success: Option<bool>,
    #[serde(default)]
    pub use_ssh_tunnel: bool,
    #[serde(default)]
    pub ssh_host: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default)]
    pub ssh_username: Option<String>,
}

/// Body for creating (`POST`) or updating (`PUT`) the Lamassu config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LamassuConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ssh_tunnel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_password: Option<String>,
    /// Path to a private key file, or the key content itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_private_key: Option<String>,
}

/// A registered DCA client as seen by the admin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaClient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wallet_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dca_mode: String,
    #[serde(default)]
    pub fixed_mode_daily_limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

/// A fiat deposit credited to a client, in centavos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaDeposit {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client_id: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// `pending` or `confirmed`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default)]
    pub confirmed_at: Option<String>,
}

/// `POST /dca/deposits` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeposit {
    pub client_id: String,
    /// Amount in centavos.
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `PUT /dca/deposits/{id}/status` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDepositStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A distribution payment as listed by `GET /dca/transactions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaPayment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub client_id: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub amount_sats: u64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub amount_fiat: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub exchange_rate: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_type: String,
    #[serde(default)]
    pub lamassu_transaction_id: Option<String>,
    #[serde(default)]
    pub payment_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

// ── TimeRange ─────────────────────────────────────────────────────────────────

/// Analytics window accepted by `GET /dashboard/analytics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Quarter,
        TimeRange::Year,
        TimeRange::All,
    ];

    /// Query-string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
            TimeRange::Year => "1y",
            TimeRange::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "7 days",
            TimeRange::Month => "30 days",
            TimeRange::Quarter => "90 days",
            TimeRange::Year => "1 year",
            TimeRange::All => "All time",
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DashboardError::InvalidTimeRange(s.to_string()))
    }
}
