//! Load balancer endpoints.
//!
//! REST endpoints:
//! - GET/POST `/load_balancers`
//! - GET/PUT/DELETE `/load_balancers/{id}`
//! - POST/DELETE `/load_balancers/{id}/servers`
//! - POST/DELETE `/load_balancers/{id}/forwarding_rules`

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::binarylane_catalog::Region;
use crate::binarylane_client::{BinaryLaneClient, null_as_default};
use crate::binarylane_error::BinaryLaneError;
use crate::binarylane_pagination::{ListOptions, Page, fetch_all};

/// A load balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancer {
    /// Load balancer ID.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Public IP address.
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    /// Size slug.
    #[serde(deserialize_with = "null_as_default")]
    pub size_slug: String,
    /// Balancing algorithm ("round_robin", "least_connections").
    #[serde(deserialize_with = "null_as_default")]
    pub algorithm: String,
    /// Status ("new", "active", "errored").
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Creation timestamp (RFC 3339).
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Forwarding rules.
    #[serde(deserialize_with = "null_as_default")]
    pub forwarding_rules: Vec<ForwardingRule>,
    /// Health check settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    /// Sticky session settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_sessions: Option<StickySessions>,
    /// Region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Tags.
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Backend server IDs.
    #[serde(deserialize_with = "null_as_default")]
    pub server_ids: Vec<u64>,
    /// Redirect HTTP to HTTPS.
    #[serde(deserialize_with = "null_as_default")]
    pub redirect_http_to_https: bool,
    /// Enable PROXY protocol towards backends.
    #[serde(deserialize_with = "null_as_default")]
    pub enable_proxy_protocol: bool,
    /// Keep backend connections alive.
    #[serde(deserialize_with = "null_as_default")]
    pub enable_backend_keepalive: bool,
    /// VPC ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<u64>,
}

impl LoadBalancer {
    /// Build an update request reproducing this load balancer's settings.
    #[must_use]
    pub fn as_request(&self) -> LoadBalancerRequest {
        LoadBalancerRequest {
            name: self.name.clone(),
            algorithm: self.algorithm.clone(),
            region: self
                .region
                .as_ref()
                .map(|r| r.slug.clone())
                .unwrap_or_default(),
            size_slug: Some(self.size_slug.clone()).filter(|s| !s.is_empty()),
            forwarding_rules: self.forwarding_rules.clone(),
            health_check: self.health_check.clone(),
            sticky_sessions: self.sticky_sessions.clone(),
            tags: self.tags.clone(),
            server_ids: self.server_ids.clone(),
            redirect_http_to_https: self.redirect_http_to_https,
            enable_proxy_protocol: self.enable_proxy_protocol,
            enable_backend_keepalive: self.enable_backend_keepalive,
            vpc_id: self.vpc_id,
        }
    }
}

/// Forwarding rule from an entry port to a target port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingRule {
    /// Entry protocol ("http", "https", "tcp").
    #[serde(deserialize_with = "null_as_default")]
    pub entry_protocol: String,
    /// Entry port.
    #[serde(deserialize_with = "null_as_default")]
    pub entry_port: u16,
    /// Target protocol.
    #[serde(deserialize_with = "null_as_default")]
    pub target_protocol: String,
    /// Target port.
    #[serde(deserialize_with = "null_as_default")]
    pub target_port: u16,
    /// TLS certificate ID.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub certificate_id: String,
    /// Pass TLS through to backends.
    #[serde(skip_serializing_if = "std::ops::Not::not", deserialize_with = "null_as_default")]
    pub tls_passthrough: bool,
}

/// Backend health check settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    /// Protocol.
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
    /// Port.
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    /// HTTP path.
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    /// Seconds between checks.
    #[serde(deserialize_with = "null_as_default")]
    pub check_interval_seconds: u32,
    /// Seconds before a check times out.
    #[serde(deserialize_with = "null_as_default")]
    pub response_timeout_seconds: u32,
    /// Successes before a backend is healthy.
    #[serde(deserialize_with = "null_as_default")]
    pub healthy_threshold: u32,
    /// Failures before a backend is unhealthy.
    #[serde(deserialize_with = "null_as_default")]
    pub unhealthy_threshold: u32,
}

/// Sticky session settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickySessions {
    /// Type ("none", "cookies").
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub session_type: String,
    /// Cookie name.
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub cookie_name: String,
    /// Cookie TTL.
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    pub cookie_ttl_seconds: u32,
}

/// Request body to create or update a load balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerRequest {
    /// Name.
    pub name: String,
    /// Balancing algorithm.
    pub algorithm: String,
    /// Region slug.
    pub region: String,
    /// Size slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_slug: Option<String>,
    /// Forwarding rules.
    pub forwarding_rules: Vec<ForwardingRule>,
    /// Health check settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    /// Sticky session settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_sessions: Option<StickySessions>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Backend server IDs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub server_ids: Vec<u64>,
    /// Redirect HTTP to HTTPS.
    pub redirect_http_to_https: bool,
    /// Enable PROXY protocol towards backends.
    pub enable_proxy_protocol: bool,
    /// Keep backend connections alive.
    pub enable_backend_keepalive: bool,
    /// VPC ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ServerIdsRequest<'a> {
    server_ids: &'a [u64],
}

#[derive(Debug, Serialize)]
struct ForwardingRulesRequest<'a> {
    forwarding_rules: &'a [ForwardingRule],
}

/// Load balancer endpoints.
pub struct LoadBalancersService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> LoadBalancersService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// Get a load balancer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get(&self, lb_id: u64) -> Result<LoadBalancer, BinaryLaneError> {
        self.client
            .get_keyed(&format!("load_balancers/{lb_id}"), "load_balancer")
            .await
    }

    /// List load balancers.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list(&self, opts: ListOptions) -> Result<Vec<LoadBalancer>, BinaryLaneError> {
        fetch_all(opts, |o| self.list_page(o)).await
    }

    /// Fetch one page of load balancers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_page(&self, opts: ListOptions) -> Result<Page<LoadBalancer>, BinaryLaneError> {
        self.client
            .get_page("load_balancers", "load_balancers", &[], opts)
            .await
    }

    /// Create a load balancer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn create(&self, req: &LoadBalancerRequest) -> Result<LoadBalancer, BinaryLaneError> {
        let (lb, _links) = self
            .client
            .send_keyed(Method::POST, "load_balancers", &[], req, "load_balancer")
            .await?;
        Ok(lb)
    }

    /// Replace a load balancer's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn update(&self, lb_id: u64, req: &LoadBalancerRequest) -> Result<LoadBalancer, BinaryLaneError> {
        let (lb, _links) = self
            .client
            .send_keyed(
                Method::PUT,
                &format!("load_balancers/{lb_id}"),
                &[],
                req,
                "load_balancer",
            )
            .await?;
        Ok(lb)
    }

    /// Delete a load balancer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, lb_id: u64) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(Method::DELETE, &format!("load_balancers/{lb_id}"), &[], None::<&()>)
            .await
    }

    /// Add backend servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add_servers(&self, lb_id: u64, server_ids: &[u64]) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(
                Method::POST,
                &format!("load_balancers/{lb_id}/servers"),
                &[],
                Some(&ServerIdsRequest { server_ids }),
            )
            .await
    }

    /// Remove backend servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove_servers(&self, lb_id: u64, server_ids: &[u64]) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(
                Method::DELETE,
                &format!("load_balancers/{lb_id}/servers"),
                &[],
                Some(&ServerIdsRequest { server_ids }),
            )
            .await
    }

    /// Add forwarding rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add_forwarding_rules(&self, lb_id: u64, rules: &[ForwardingRule]) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(
                Method::POST,
                &format!("load_balancers/{lb_id}/forwarding_rules"),
                &[],
                Some(&ForwardingRulesRequest {
                    forwarding_rules: rules,
                }),
            )
            .await
    }

    /// Remove forwarding rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove_forwarding_rules(&self, lb_id: u64, rules: &[ForwardingRule]) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(
                Method::DELETE,
                &format!("load_balancers/{lb_id}/forwarding_rules"),
                &[],
                Some(&ForwardingRulesRequest {
                    forwarding_rules: rules,
                }),
            )
            .await
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(v: &u32) -> bool {
    *v == 0
}
