//! `BinaryLane` REST client.
//!
//! Unique responsibility: own the HTTP transport (auth, timeouts, URL building,
//! response decoding) and hand out the per-resource services.
//!
//! API endpoint:
//! - <https://api.binarylane.com.au/v2>
//! - Header: Authorization: Bearer <token>
//!
//! All configuration can be loaded from environment variables.

use std::{env, time::Duration};

use reqwest::{Method, header::HeaderMap};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::binarylane_account::AccountService;
use crate::binarylane_actions::ActionsService;
use crate::binarylane_catalog::{RegionsService, SizesService};
use crate::binarylane_error::BinaryLaneError;
use crate::binarylane_load_balancers::LoadBalancersService;
use crate::binarylane_pagination::{Links, ListOptions, Meta, Page};
use crate::binarylane_server_actions::ServerActionsService;
use crate::binarylane_servers::ServersService;

const DEFAULT_API_URL: &str = "https://api.binarylane.com.au/v2";
const DEFAULT_USER_AGENT: &str = "binarylane-client/0.1";

/// Configuration for the `BinaryLane` client.
#[derive(Clone, Debug)]
pub struct BinaryLaneClientConfig {
    /// API token for authentication.
    /// Env: `BINARYLANE_API_TOKEN` (required)
    pub api_token: String,

    /// Base URL of the REST API, including the version segment.
    /// Env: `BINARYLANE_API_URL` (default: "<https://api.binarylane.com.au/v2>")
    pub api_url: String,

    /// HTTP request timeout in milliseconds.
    /// Env: `BINARYLANE_HTTP_TIMEOUT_MS` (default: 30000)
    pub timeout_ms: u64,

    /// User agent for HTTP requests.
    /// Env: `BINARYLANE_USER_AGENT` (default: "binarylane-client/0.1")
    pub user_agent: String,

    /// Fixed interval between action status probes in milliseconds.
    /// Env: `BINARYLANE_ACTION_POLL_INTERVAL_MS` (default: 5000)
    pub action_poll_interval_ms: u64,

    /// Upper bound on how long to wait for an action in milliseconds.
    /// Env: `BINARYLANE_ACTION_TIMEOUT_MS` (default: 600000 = 10 minutes)
    pub action_timeout_ms: u64,
}

impl BinaryLaneClientConfig {
    /// Build a configuration with defaults and the given API token.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            action_poll_interval_ms: 5_000,
            action_timeout_ms: 600_000,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// In local dev, this will also attempt to load `.env` from the current directory.
    /// If `.env` is missing, it does not fail.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, BinaryLaneError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_token: must_env("BINARYLANE_API_TOKEN")?,
            api_url: env::var("BINARYLANE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout_ms: parse_u64_env("BINARYLANE_HTTP_TIMEOUT_MS", 30_000)?,
            user_agent: env::var("BINARYLANE_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            action_poll_interval_ms: parse_u64_env("BINARYLANE_ACTION_POLL_INTERVAL_MS", 5_000)?,
            action_timeout_ms: parse_u64_env("BINARYLANE_ACTION_TIMEOUT_MS", 600_000)?,
        })
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the action poll interval.
    #[must_use]
    pub fn with_action_poll_interval(mut self, interval: Duration) -> Self {
        self.action_poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Action poll interval as a `Duration`.
    #[must_use]
    pub const fn action_poll_interval(&self) -> Duration {
        Duration::from_millis(self.action_poll_interval_ms)
    }

    /// Action wait timeout as a `Duration`.
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}

/// Rate limit counters reported by the API on every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rate {
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Unix timestamp (seconds) at which the window resets.
    pub reset: Option<u64>,
}

impl Rate {
    /// Read the `RateLimit-*` headers. Returns `None` when the limit header is absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        let limit = read("ratelimit-limit")?;
        Some(Self {
            limit: u32::try_from(limit).unwrap_or(u32::MAX),
            remaining: read("ratelimit-remaining")
                .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX)),
            reset: read("ratelimit-reset"),
        })
    }
}

/// Raw successful response: body text plus rate counters.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) body: String,
    pub(crate) rate: Option<Rate>,
}

/// Client for the `BinaryLane` REST API.
pub struct BinaryLaneClient {
    cfg: BinaryLaneClientConfig,
    http: reqwest::Client,
}

impl BinaryLaneClient {
    /// Create a new `BinaryLane` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: BinaryLaneClientConfig) -> Result<Self, BinaryLaneError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()?;

        Ok(Self { cfg, http })
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &BinaryLaneClientConfig {
        &self.cfg
    }

    /// Account endpoints.
    #[must_use]
    pub const fn account(&self) -> AccountService<'_> {
        AccountService::new(self)
    }

    /// Action endpoints.
    #[must_use]
    pub const fn actions(&self) -> ActionsService<'_> {
        ActionsService::new(self)
    }

    /// Load balancer endpoints.
    #[must_use]
    pub const fn load_balancers(&self) -> LoadBalancersService<'_> {
        LoadBalancersService::new(self)
    }

    /// Region endpoints.
    #[must_use]
    pub const fn regions(&self) -> RegionsService<'_> {
        RegionsService::new(self)
    }

    /// Server action endpoints (power, reboot, resize, ...).
    #[must_use]
    pub const fn server_actions(&self) -> ServerActionsService<'_> {
        ServerActionsService::new(self)
    }

    /// Server endpoints.
    #[must_use]
    pub const fn servers(&self) -> ServersService<'_> {
        ServersService::new(self)
    }

    /// Size endpoints.
    #[must_use]
    pub const fn sizes(&self) -> SizesService<'_> {
        SizesService::new(self)
    }

    /// Resolve a path (relative to the API URL) or absolute URI, adding query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, BinaryLaneError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.cfg.api_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut url = Url::parse(&raw).map_err(|source| BinaryLaneError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse, BinaryLaneError> {
        let url = self.url(path, query)?;
        debug!("binarylane request: {method} {url}");

        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.cfg.api_token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let rate = Rate::from_headers(resp.headers());
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(BinaryLaneError::Api { status, body: text });
        }

        Ok(RawResponse { body: text, rate })
    }

    /// GET `path` and decode the object stored under `key`.
    pub(crate) async fn get_keyed<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<T, BinaryLaneError> {
        let raw = self.send(Method::GET, path, &[], None::<&()>).await?;
        let mut root = decode_root(&raw.body)?;
        take_keyed(&mut root, key, &raw.body)
    }

    /// Send `body` with `method` and decode the object stored under `key`.
    pub(crate) async fn send_keyed<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
        key: &str,
    ) -> Result<(T, Links), BinaryLaneError> {
        let raw = self.send(method, path, query, Some(body)).await?;
        let mut root = decode_root(&raw.body)?;
        let value = take_keyed(&mut root, key, &raw.body)?;
        let links = take_optional(&mut root, "links", &raw.body)?.unwrap_or_default();
        Ok((value, links))
    }

    /// Send a request whose response body carries nothing of interest.
    pub(crate) async fn send_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(), BinaryLaneError> {
        self.send(method, path, query, body).await.map(|_| ())
    }

    /// Fetch one page of a list endpoint whose items live under `key`.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        extra_query: &[(&str, String)],
        opts: ListOptions,
    ) -> Result<Page<T>, BinaryLaneError> {
        let mut query = extra_query.to_vec();
        query.extend(opts.query_pairs());

        let raw = self.send(Method::GET, path, &query, None::<&()>).await?;
        let mut root = decode_root(&raw.body)?;

        let items: Vec<T> = take_optional(&mut root, key, &raw.body)?.unwrap_or_default();
        let links: Option<Links> = take_optional(&mut root, "links", &raw.body)?;
        let meta: Option<Meta> = take_optional(&mut root, "meta", &raw.body)?;

        debug!(path, items = items.len(), "binarylane page fetched");

        Ok(Page {
            items,
            links,
            meta,
            rate: raw.rate,
        })
    }
}

// ============================================================================
// Decoding helpers
// ============================================================================

/// Field deserializer reading an explicit `null` as the type's default.
///
/// Use with `#[serde(deserialize_with = "null_as_default")]` on non-optional
/// model fields; a missing key is still covered by `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn decode_root(body: &str) -> Result<Map<String, Value>, BinaryLaneError> {
    if body.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(body).map_err(|source| BinaryLaneError::Json {
        source,
        body: body.to_string(),
    })
}

fn take_optional<T: DeserializeOwned>(
    root: &mut Map<String, Value>,
    key: &str,
    body: &str,
) -> Result<Option<T>, BinaryLaneError> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| BinaryLaneError::Json {
                source,
                body: body.to_string(),
            }),
    }
}

fn take_keyed<T: DeserializeOwned>(
    root: &mut Map<String, Value>,
    key: &str,
    body: &str,
) -> Result<T, BinaryLaneError> {
    let value = root.remove(key).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| BinaryLaneError::Json {
        source,
        body: body.to_string(),
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn must_env(key: &'static str) -> Result<String, BinaryLaneError> {
    env::var(key).map_err(|_| BinaryLaneError::MissingEnv(key))
}

fn parse_u64_env(key: &'static str, default: u64) -> Result<u64, BinaryLaneError> {
    env::var(key).map_or_else(
        |_| Ok(default),
        |v| {
            v.parse::<u64>().map_err(|_| BinaryLaneError::InvalidEnv {
                key,
                value: v,
                reason: "expected an unsigned integer",
            })
        },
    )
}
