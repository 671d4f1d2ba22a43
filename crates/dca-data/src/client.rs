//! REST client for the DCA client and admin extension APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use dca_core::error::{DashboardError, Result};
use dca_core::models::{
    lenient_items, ClientAnalytics, ClientRegistration, ClientTransaction, CreateDeposit, DashboardSummary,
    DcaClient, DcaDeposit, DcaPayment, LamassuConfig, LamassuConfigRequest, RegistrationStatus,
    TimeRange, UpdateClientSettings, UpdateDepositStatus,
};
use dca_core::settings::{DEFAULT_ADMIN_PREFIX, DEFAULT_API_PREFIX};

/// Header carrying the wallet key (`X-Api-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ── DashboardSource ───────────────────────────────────────────────────────────

/// The three reads behind one dashboard load.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn summary(&self) -> Result<DashboardSummary>;

    async fn transactions(&self, limit: u32) -> Result<Vec<ClientTransaction>>;

    async fn analytics(&self, range: TimeRange) -> Result<ClientAnalytics>;
}

// ── Query options ─────────────────────────────────────────────────────────────

/// Paging and filtering for `GET /dashboard/transactions`.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub limit: u32,
    pub offset: u32,
    pub transaction_type: Option<String>,
}

impl TransactionQuery {
    pub fn latest(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.max(1).to_string())];
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        if let Some(kind) = &self.transaction_type {
            pairs.push(("transaction_type", kind.clone()));
        }
        pairs
    }
}

/// Which credential a request is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Client,
    Admin,
}

// ── DcaApiClient ──────────────────────────────────────────────────────────────

/// HTTP client for the DCA extension endpoints.
#[derive(Debug, Clone)]
pub struct DcaApiClient {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
    admin_prefix: String,
    api_key: Option<String>,
    admin_key: Option<String>,
}

impl DcaApiClient {
    /// Create a client for `base_url` using the default API prefixes.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: trim_base(base_url.into()),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            admin_prefix: DEFAULT_ADMIN_PREFIX.to_string(),
            api_key,
            admin_key: None,
        })
    }

    /// Override the client API prefix, e.g. `/myextension/api/v1`.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = normalize_prefix(prefix.into());
        self
    }

    /// Override the admin API prefix.
    pub fn with_admin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.admin_prefix = normalize_prefix(prefix.into());
        self
    }

    /// Attach the admin key used for `/dca/...` endpoints.
    pub fn with_admin_key(mut self, key: Option<String>) -> Self {
        self.admin_key = key;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a client endpoint.
    pub fn client_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    /// Full URL of an admin endpoint.
    pub fn admin_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.admin_prefix, path)
    }

    // ── Client endpoints ──────────────────────────────────────────────────

    /// GET /dashboard/summary
    pub async fn get_summary(&self) -> Result<DashboardSummary> {
        self.request(Scope::Client, Method::GET, "/dashboard/summary", &[], None::<&()>)
            .await
    }

    /// GET /dashboard/transactions
    pub async fn get_transactions(&self, query: &TransactionQuery) -> Result<Vec<ClientTransaction>> {
        self.request_list(
            Scope::Client,
            Method::GET,
            "/dashboard/transactions",
            &query.to_pairs(),
            None::<&()>,
        )
        .await
    }

    /// Every transaction, fetched `page_size` at a time until a short page.
    pub async fn get_all_transactions(&self, page_size: u32) -> Result<Vec<ClientTransaction>> {
        let page_size = page_size.max(1);
        let mut query = TransactionQuery::latest(page_size);
        let mut all = Vec::new();

        loop {
            let page = self.get_transactions(&query).await?;
            let fetched = page.len();
            all.extend(page);
            debug!(offset = query.offset, fetched, "fetched transactions page");
            if fetched < page_size as usize {
                break;
            }
            query.offset = query.offset.saturating_add(page_size);
        }

        Ok(all)
    }

    /// GET /dashboard/analytics
    pub async fn get_analytics(&self, range: TimeRange) -> Result<ClientAnalytics> {
        self.request(
            Scope::Client,
            Method::GET,
            "/dashboard/analytics",
            &[("time_range", range.as_str().to_string())],
            None::<&()>,
        )
        .await
    }

    /// PUT /dashboard/settings
    pub async fn update_settings(&self, settings: &UpdateClientSettings) -> Result<Value> {
        self.request(
            Scope::Client,
            Method::PUT,
            "/dashboard/settings",
            &[],
            Some(settings),
        )
        .await
    }

    /// GET /dashboard/export/transactions?format=csv
    ///
    /// Returns the CSV document exactly as the server rendered it.
    pub async fn export_transactions_csv(&self) -> Result<String> {
        let response = self
            .send(
                Scope::Client,
                Method::GET,
                "/dashboard/export/transactions",
                &[("format", "csv".to_string())],
                None::<&()>,
            )
            .await?;
        response.text().await.map_err(|e| DashboardError::Request {
            endpoint: "/dashboard/export/transactions".to_string(),
            message: e.to_string(),
        })
    }

    /// GET /registration-status
    pub async fn registration_status(&self) -> Result<RegistrationStatus> {
        self.request(Scope::Client, Method::GET, "/registration-status", &[], None::<&()>)
            .await
    }

    /// POST /register
    ///
    /// A `409 Conflict` becomes [`DashboardError::AlreadyRegistered`].
    pub async fn register(&self, registration: &ClientRegistration) -> Result<Value> {
        match self
            .request(Scope::Client, Method::POST, "/register", &[], Some(registration))
            .await
        {
            Err(DashboardError::Api {
                status: 409,
                detail,
                ..
            }) => Err(DashboardError::AlreadyRegistered(detail)),
            other => other,
        }
    }

    // ── Admin endpoints ───────────────────────────────────────────────────

    /// GET /dca/config
    pub async fn get_lamassu_config(&self) -> Result<Option<LamassuConfig>> {
        self.request(Scope::Admin, Method::GET, "/dca/config", &[], None::<&()>)
            .await
    }

    /// POST /dca/config
    pub async fn create_lamassu_config(&self, config: &LamassuConfigRequest) -> Result<LamassuConfig> {
        self.request(Scope::Admin, Method::POST, "/dca/config", &[], Some(config))
            .await
    }

    /// PUT /dca/config
    pub async fn update_lamassu_config(&self, config: &LamassuConfigRequest) -> Result<LamassuConfig> {
        self.request(Scope::Admin, Method::PUT, "/dca/config", &[], Some(config))
            .await
    }

    /// GET /dca/clients
    pub async fn list_clients(&self) -> Result<Vec<DcaClient>> {
        self.request_list(Scope::Admin, Method::GET, "/dca/clients", &[], None::<&()>)
            .await
    }

    /// GET /dca/deposits
    pub async fn list_deposits(&self) -> Result<Vec<DcaDeposit>> {
        self.request_list(Scope::Admin, Method::GET, "/dca/deposits", &[], None::<&()>)
            .await
    }

    /// POST /dca/deposits
    pub async fn create_deposit(&self, deposit: &CreateDeposit) -> Result<DcaDeposit> {
        self.request(Scope::Admin, Method::POST, "/dca/deposits", &[], Some(deposit))
            .await
    }

    /// PUT /dca/deposits/{id}/status
    pub async fn update_deposit_status(
        &self,
        deposit_id: &str,
        update: &UpdateDepositStatus,
    ) -> Result<DcaDeposit> {
        let path = format!("/dca/deposits/{deposit_id}/status");
        self.request(Scope::Admin, Method::PUT, &path, &[], Some(update))
            .await
    }

    /// GET /dca/transactions
    pub async fn list_payments(&self) -> Result<Vec<DcaPayment>> {
        self.request_list(Scope::Admin, Method::GET, "/dca/transactions", &[], None::<&()>)
            .await
    }

    /// POST /dca/test-connection
    pub async fn test_connection(&self) -> Result<Value> {
        self.request(Scope::Admin, Method::POST, "/dca/test-connection", &[], None::<&()>)
            .await
    }

    /// POST /dca/manual-poll
    pub async fn manual_poll(&self) -> Result<Value> {
        self.request(Scope::Admin, Method::POST, "/dca/manual-poll", &[], None::<&()>)
            .await
    }

    /// POST /dca/test-transaction
    pub async fn test_transaction(&self) -> Result<Value> {
        self.request(Scope::Admin, Method::POST, "/dca/test-transaction", &[], None::<&()>)
            .await
    }

    // ── Plumbing ──────────────────────────────────────────────────────────

    fn create_headers(&self, scope: Scope) -> Result<HeaderMap> {
        let (key, name) = match scope {
            Scope::Client => (self.api_key.as_deref(), "API key"),
            Scope::Admin => (self.admin_key.as_deref(), "admin key"),
        };
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| DashboardError::Config(format!("{name} is required")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let value = HeaderValue::from_str(key)
            .map_err(|e| DashboardError::Config(format!("Invalid {name}: {e}")))?;
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }

    fn url_for(&self, scope: Scope, path: &str) -> String {
        match scope {
            Scope::Client => self.client_url(path),
            Scope::Admin => self.admin_url(path),
        }
    }

    /// Send a request and return the response once its status is a success.
    async fn send<B: Serialize + ?Sized>(
        &self,
        scope: Scope,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let headers = self.create_headers(scope)?;
        let url = self.url_for(scope, path);
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, &url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| DashboardError::Request {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(path, status, response).await);
        }
        Ok(response)
    }

    /// Send a request and decode its JSON body.
    async fn request<T, B>(
        &self,
        scope: Scope,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(scope, method, path, query, body).await?;
        let text = response.text().await.map_err(|e| DashboardError::Request {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request whose body is a JSON list, skipping malformed elements.
    async fn request_list<T, B>(
        &self,
        scope: Scope,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value: Value = self.request(scope, method, path, query, body).await?;
        Ok(match value {
            Value::Array(items) => lenient_items(items),
            Value::Null => Vec::new(),
            other => {
                warn!(path, found = %other, "expected a JSON list");
                Vec::new()
            }
        })
    }

    /// Map a non-success response to [`DashboardError::Api`], preferring the
    /// server's `detail` message over the raw body.
    async fn handle_error_response(
        path: &str,
        status: StatusCode,
        response: reqwest::Response,
    ) -> DashboardError {
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                body.clone()
            }
        });

        if status.is_server_error() {
            warn!("Server error {} on {}: {}", status.as_u16(), path, detail);
        }

        DashboardError::Api {
            endpoint: path.to_string(),
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl DashboardSource for DcaApiClient {
    async fn summary(&self) -> Result<DashboardSummary> {
        self.get_summary().await
    }

    async fn transactions(&self, limit: u32) -> Result<Vec<ClientTransaction>> {
        self.get_transactions(&TransactionQuery::latest(limit)).await
    }

    async fn analytics(&self, range: TimeRange) -> Result<ClientAnalytics> {
        self.get_analytics(range).await
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Pull the `detail` field out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn normalize_prefix(prefix: String) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
