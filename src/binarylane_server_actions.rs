//! Server actions (power, reboot, resize, snapshots, ...).
//!
//! REST endpoints:
//! - POST `/servers/{id}/actions`          -> `{"action": {...}}`
//! - POST `/servers/actions?tag_name=...`  -> `{"actions": [...]}`
//! - GET  `/servers/{id}/actions/{action}` -> `{"action": {...}}`
//!
//! Every call returns as soon as the API accepts it. Hand the returned
//! action's [`Action::reference`] to `BinaryLaneClient::wait_for_action` to
//! block until the operation is over.

use reqwest::Method;
use serde_json::{Map, Value, json};

use crate::binarylane_actions::Action;
use crate::binarylane_client::BinaryLaneClient;
use crate::binarylane_error::BinaryLaneError;

/// Free-form action request body; always carries a `type` entry.
pub type ActionRequest = Map<String, Value>;

/// Build an action request of the given type with extra parameters.
#[must_use]
pub fn action_request(action_type: &str, params: &[(&str, Value)]) -> ActionRequest {
    let mut req = Map::new();
    req.insert("type".to_string(), Value::String(action_type.to_string()));
    for (key, value) in params {
        req.insert((*key).to_string(), value.clone());
    }
    req
}

/// Server action endpoints.
pub struct ServerActionsService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> ServerActionsService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// Get one action of a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get(&self, server_id: u64, action_id: u64) -> Result<Action, BinaryLaneError> {
        self.client
            .get_keyed(&format!("servers/{server_id}/actions/{action_id}"), "action")
            .await
    }

    /// Start an arbitrary action on a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn perform(&self, server_id: u64, req: &ActionRequest) -> Result<Action, BinaryLaneError> {
        let (action, _links) = self
            .client
            .send_keyed(
                Method::POST,
                &format!("servers/{server_id}/actions"),
                &[],
                req,
                "action",
            )
            .await?;
        Ok(action)
    }

    /// Start an arbitrary action on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn perform_by_tag(&self, tag: &str, req: &ActionRequest) -> Result<Vec<Action>, BinaryLaneError> {
        let (actions, _links) = self
            .client
            .send_keyed(
                Method::POST,
                "servers/actions",
                &[("tag_name", tag.to_string())],
                req,
                "actions",
            )
            .await?;
        Ok(actions)
    }

    async fn simple(&self, server_id: u64, action_type: &str) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request(action_type, &[])).await
    }

    async fn simple_by_tag(&self, tag: &str, action_type: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.perform_by_tag(tag, &action_request(action_type, &[])).await
    }

    /// Graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn shutdown(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "shutdown").await
    }

    /// Graceful shutdown of every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn shutdown_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "shutdown").await
    }

    /// Hard power off.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_off(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "power_off").await
    }

    /// Hard power off of every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_off_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "power_off").await
    }

    /// Power on.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_on(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "power_on").await
    }

    /// Power on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_on_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "power_on").await
    }

    /// Power cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_cycle(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "power_cycle").await
    }

    /// Power cycle every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn power_cycle_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "power_cycle").await
    }

    /// Graceful reboot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn reboot(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "reboot").await
    }

    /// Restore the server from a backup image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn restore(&self, server_id: u64, image_id: u64) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("restore", &[("image", json!(image_id))]))
            .await
    }

    /// Resize to another size, optionally growing the disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn resize(&self, server_id: u64, size_slug: &str, resize_disk: bool) -> Result<Action, BinaryLaneError> {
        let req = action_request(
            "resize",
            &[("size", json!(size_slug)), ("disk", json!(resize_disk))],
        );
        self.perform(server_id, &req).await
    }

    /// Rename the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn rename(&self, server_id: u64, name: &str) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("rename", &[("name", json!(name))]))
            .await
    }

    /// Take a snapshot named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn snapshot(&self, server_id: u64, name: &str) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("snapshot", &[("name", json!(name))]))
            .await
    }

    /// Snapshot every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn snapshot_by_tag(&self, tag: &str, name: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.perform_by_tag(tag, &action_request("snapshot", &[("name", json!(name))]))
            .await
    }

    /// Enable backups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_backups(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "enable_backups").await
    }

    /// Enable backups on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_backups_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "enable_backups").await
    }

    /// Disable backups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn disable_backups(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "disable_backups").await
    }

    /// Disable backups on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn disable_backups_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "disable_backups").await
    }

    /// Reset the root password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn password_reset(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "password_reset").await
    }

    /// Rebuild from an image ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn rebuild_by_image_id(&self, server_id: u64, image_id: u64) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("rebuild", &[("image", json!(image_id))]))
            .await
    }

    /// Rebuild from an image slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn rebuild_by_image_slug(&self, server_id: u64, slug: &str) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("rebuild", &[("image", json!(slug))]))
            .await
    }

    /// Switch to another kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn change_kernel(&self, server_id: u64, kernel_id: u64) -> Result<Action, BinaryLaneError> {
        self.perform(server_id, &action_request("change_kernel", &[("kernel", json!(kernel_id))]))
            .await
    }

    /// Enable IPv6.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_ipv6(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "enable_ipv6").await
    }

    /// Enable IPv6 on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_ipv6_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "enable_ipv6").await
    }

    /// Enable private networking.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_private_networking(&self, server_id: u64) -> Result<Action, BinaryLaneError> {
        self.simple(server_id, "enable_private_networking").await
    }

    /// Enable private networking on every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn enable_private_networking_by_tag(&self, tag: &str) -> Result<Vec<Action>, BinaryLaneError> {
        self.simple_by_tag(tag, "enable_private_networking").await
    }
}
