//! Asynchronous actions.
//!
//! Mutating calls (create, reboot, resize, ...) return immediately with an
//! action describing the server-side operation. This module models those
//! actions and exposes the endpoints used to observe them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::binarylane_client::{BinaryLaneClient, null_as_default};
use crate::binarylane_error::BinaryLaneError;
use crate::binarylane_pagination::{ListOptions, Page, fetch_all};

/// Status of an action.
///
/// `Completed` and `Errored` are terminal: once observed, an action never
/// reports `InProgress` again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    /// Still running.
    #[default]
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with a failure.
    Errored,
}

impl ActionStatus {
    /// True for `Completed` and `Errored`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Errored => "errored",
        })
    }
}

/// A server-side asynchronous operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    /// Current status. Missing status reads as in-progress.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ActionStatus,
    /// Action type (e.g. "reboot", "create").
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub action_type: String,
    /// Start timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Completion timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// ID of the resource the action applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u64>,
    /// Kind of resource the action applies to (e.g. "server").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Region slug of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_slug: Option<String>,
}

impl Action {
    /// Reference usable to poll this action later.
    ///
    /// Server actions are addressed under their server; anything else by ID.
    #[must_use]
    pub fn reference(&self) -> ActionReference {
        match (self.resource_type.as_deref(), self.resource_id) {
            (Some("server"), Some(server_id)) => ActionReference::ServerAction {
                server_id,
                action_id: self.id,
            },
            _ => ActionReference::Action { action_id: self.id },
        }
    }
}

/// Action link returned in `links.actions` by mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    /// Action ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    /// Relation (e.g. "create", "multiple_create").
    #[serde(default, deserialize_with = "null_as_default")]
    pub rel: String,
    /// Status URI of the action.
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
}

impl ActionLink {
    /// Reference to poll this action, preferring the status URI.
    #[must_use]
    pub fn reference(&self) -> ActionReference {
        if self.href.is_empty() {
            ActionReference::Action { action_id: self.id }
        } else {
            ActionReference::Uri(self.href.clone())
        }
    }
}

/// Identifies a pending action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionReference {
    /// An action scoped to a server.
    ServerAction {
        /// Server ID.
        server_id: u64,
        /// Action ID.
        action_id: u64,
    },
    /// An action addressed by its global ID.
    Action {
        /// Action ID.
        action_id: u64,
    },
    /// An opaque status URI returned by the server.
    Uri(String),
}

impl ActionReference {
    /// Path (relative to the API URL) or absolute URI of the action resource.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty status URI.
    pub fn location(&self) -> Result<String, BinaryLaneError> {
        match self {
            Self::ServerAction {
                server_id,
                action_id,
            } => Ok(format!("servers/{server_id}/actions/{action_id}")),
            Self::Action { action_id } => Ok(format!("actions/{action_id}")),
            Self::Uri(uri) if uri.trim().is_empty() => {
                Err(BinaryLaneError::InvalidActionReference("status uri is empty"))
            }
            Self::Uri(uri) => Ok(uri.clone()),
        }
    }
}

impl fmt::Display for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerAction {
                server_id,
                action_id,
            } => write!(f, "server {server_id} action {action_id}"),
            Self::Action { action_id } => write!(f, "action {action_id}"),
            Self::Uri(uri) => write!(f, "action at {uri}"),
        }
    }
}

/// Account-wide action endpoints.
pub struct ActionsService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> ActionsService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// Get an action by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get(&self, action_id: u64) -> Result<Action, BinaryLaneError> {
        self.client
            .get_keyed(&format!("actions/{action_id}"), "action")
            .await
    }

    /// Get an action from the status URI returned by a mutating call.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is empty, the request fails, or the response
    /// cannot be decoded.
    pub async fn get_by_uri(&self, uri: &str) -> Result<Action, BinaryLaneError> {
        self.get_by_reference(&ActionReference::Uri(uri.to_string()))
            .await
    }

    /// Get the current state of a referenced action.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is invalid, the request fails, or the
    /// response cannot be decoded.
    pub async fn get_by_reference(&self, reference: &ActionReference) -> Result<Action, BinaryLaneError> {
        let location = reference.location()?;
        self.client.get_keyed(&location, "action").await
    }

    /// List account actions.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list(&self, opts: ListOptions) -> Result<Vec<Action>, BinaryLaneError> {
        fetch_all(opts, |o| self.list_page(o)).await
    }

    /// Fetch one page of account actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_page(&self, opts: ListOptions) -> Result<Page<Action>, BinaryLaneError> {
        self.client.get_page("actions", "actions", &[], opts).await
    }
}
