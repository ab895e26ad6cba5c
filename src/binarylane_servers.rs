//! Server endpoints.
//!
//! REST endpoints:
//! - GET/POST/DELETE `/servers`
//! - GET/DELETE `/servers/{id}`
//! - GET `/servers/{id}/{kernels,snapshots,backups,actions,neighbors}`
//!
//! Creating servers returns immediately; the `links.actions` entries of the
//! response identify the provisioning actions to wait on.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::binarylane_actions::{Action, ActionLink};
use crate::binarylane_catalog::Region;
use crate::binarylane_client::{BinaryLaneClient, null_as_default};
use crate::binarylane_error::BinaryLaneError;
use crate::binarylane_pagination::{ListOptions, Page, fetch_all};

/// A virtual server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Server ID.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Server name (hostname).
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Memory in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub memory: u64,
    /// Virtual CPU count.
    #[serde(deserialize_with = "null_as_default")]
    pub vcpus: u32,
    /// Disk size in GB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk: u64,
    /// Whether the server is locked against changes.
    #[serde(deserialize_with = "null_as_default")]
    pub locked: bool,
    /// Status ("new", "active", "off", "archive").
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Creation timestamp (RFC 3339).
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    /// Size slug.
    #[serde(deserialize_with = "null_as_default")]
    pub size_slug: String,
    /// Region the server runs in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Image the server was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    /// Network interfaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Networks>,
    /// Backup image IDs.
    #[serde(deserialize_with = "null_as_default")]
    pub backup_ids: Vec<u64>,
    /// Snapshot image IDs.
    #[serde(deserialize_with = "null_as_default")]
    pub snapshot_ids: Vec<u64>,
    /// Tags.
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// VPC ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<u64>,
}

impl Server {
    /// First public IPv4 address.
    #[must_use]
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks.as_ref().and_then(|n| n.v4_of_type("public"))
    }

    /// First private IPv4 address.
    #[must_use]
    pub fn private_ipv4(&self) -> Option<&str> {
        self.networks.as_ref().and_then(|n| n.v4_of_type("private"))
    }

    /// First public IPv6 address.
    #[must_use]
    pub fn public_ipv6(&self) -> Option<&str> {
        self.networks.as_ref().and_then(|n| {
            n.v6.iter()
                .find(|net| net.network_type == "public")
                .map(|net| net.ip_address.as_str())
        })
    }
}

/// Network interfaces of a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Networks {
    /// IPv4 networks.
    #[serde(deserialize_with = "null_as_default")]
    pub v4: Vec<NetworkV4>,
    /// IPv6 networks.
    #[serde(deserialize_with = "null_as_default")]
    pub v6: Vec<NetworkV6>,
}

impl Networks {
    fn v4_of_type(&self, network_type: &str) -> Option<&str> {
        self.v4
            .iter()
            .find(|net| net.network_type == network_type)
            .map(|net| net.ip_address.as_str())
    }
}

/// IPv4 network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkV4 {
    /// Address.
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    /// Netmask.
    #[serde(deserialize_with = "null_as_default")]
    pub netmask: String,
    /// Gateway.
    #[serde(deserialize_with = "null_as_default")]
    pub gateway: String,
    /// "public" or "private".
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub network_type: String,
}

/// IPv6 network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkV6 {
    /// Address.
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    /// Prefix length.
    #[serde(deserialize_with = "null_as_default")]
    pub netmask: u8,
    /// Gateway.
    #[serde(deserialize_with = "null_as_default")]
    pub gateway: String,
    /// "public".
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub network_type: String,
}

/// Operating system image, snapshot, or backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Image ID.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Image name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Distribution name.
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: String,
    /// Image slug, for public images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Whether the image is public.
    #[serde(deserialize_with = "null_as_default")]
    pub public: bool,
    /// Image kind ("snapshot", "backup", ...).
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub image_type: String,
    /// Creation timestamp (RFC 3339).
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
}

/// Kernel available to a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kernel {
    /// Kernel ID.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Kernel name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Kernel version.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
}

/// Image used to build a server: a numeric ID or a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerCreateImage {
    /// Image ID.
    Id(u64),
    /// Image slug.
    Slug(String),
}

/// Request body to create one server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerCreateRequest {
    /// Server name.
    pub name: String,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image to build from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ServerCreateImage>,
    /// SSH key IDs to install.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<u64>,
    /// Enable backups.
    pub backups: bool,
    /// Enable IPv6.
    pub ipv6: bool,
    /// Enable private networking.
    pub private_networking: bool,
    /// Enable monitoring.
    pub monitoring: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// VPC ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<u64>,
}

/// Request body to create several identical servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerMultiCreateRequest {
    /// Server names, one server per name.
    pub names: Vec<String>,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Image to build from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ServerCreateImage>,
    /// SSH key IDs to install.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<u64>,
    /// Enable backups.
    pub backups: bool,
    /// Enable IPv6.
    pub ipv6: bool,
    /// Enable private networking.
    pub private_networking: bool,
    /// Enable monitoring.
    pub monitoring: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// VPC ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<u64>,
}

/// A newly created server plus the actions provisioning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedServer<T> {
    /// The server (or servers) as returned by the create call.
    pub server: T,
    /// Provisioning actions to wait on.
    pub actions: Vec<ActionLink>,
}

/// Server endpoints.
pub struct ServersService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> ServersService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// List servers.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list(&self, opts: ListOptions) -> Result<Vec<Server>, BinaryLaneError> {
        fetch_all(opts, |o| self.list_page(o)).await
    }

    /// Fetch one page of servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_page(&self, opts: ListOptions) -> Result<Page<Server>, BinaryLaneError> {
        self.client.get_page("servers", "servers", &[], opts).await
    }

    /// List servers carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list_by_tag(&self, tag: &str, opts: ListOptions) -> Result<Vec<Server>, BinaryLaneError> {
        let query = [("tag_name", tag.to_string())];
        fetch_all(opts, |o| self.client.get_page("servers", "servers", &query, o)).await
    }

    /// Get a server by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get(&self, server_id: u64) -> Result<Server, BinaryLaneError> {
        self.client
            .get_keyed(&format!("servers/{server_id}"), "server")
            .await
    }

    /// Create a server.
    ///
    /// Returns as soon as the API accepts the request; wait on
    /// `CreatedServer::actions` to know when it is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn create(&self, req: &ServerCreateRequest) -> Result<CreatedServer<Server>, BinaryLaneError> {
        let (server, links) = self
            .client
            .send_keyed(Method::POST, "servers", &[], req, "server")
            .await?;
        Ok(CreatedServer {
            server,
            actions: links.actions,
        })
    }

    /// Create several servers in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn create_multiple(
        &self,
        req: &ServerMultiCreateRequest,
    ) -> Result<CreatedServer<Vec<Server>>, BinaryLaneError> {
        let (servers, links) = self
            .client
            .send_keyed(Method::POST, "servers", &[], req, "servers")
            .await?;
        Ok(CreatedServer {
            server: servers,
            actions: links.actions,
        })
    }

    /// Delete a server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, server_id: u64) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(Method::DELETE, &format!("servers/{server_id}"), &[], None::<&()>)
            .await
    }

    /// Delete every server carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_by_tag(&self, tag: &str) -> Result<(), BinaryLaneError> {
        self.client
            .send_empty(Method::DELETE, "servers", &[("tag_name", tag.to_string())], None::<&()>)
            .await
    }

    /// Kernels available to a server.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn kernels(&self, server_id: u64, opts: ListOptions) -> Result<Vec<Kernel>, BinaryLaneError> {
        self.nested_list(server_id, "kernels", opts).await
    }

    /// Snapshots of a server.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn snapshots(&self, server_id: u64, opts: ListOptions) -> Result<Vec<Image>, BinaryLaneError> {
        self.nested_list(server_id, "snapshots", opts).await
    }

    /// Backups of a server.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn backups(&self, server_id: u64, opts: ListOptions) -> Result<Vec<Image>, BinaryLaneError> {
        self.nested_list(server_id, "backups", opts).await
    }

    /// Actions performed on a server.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn actions(&self, server_id: u64, opts: ListOptions) -> Result<Vec<Action>, BinaryLaneError> {
        self.nested_list(server_id, "actions", opts).await
    }

    /// Servers sharing a physical host with this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn neighbors(&self, server_id: u64) -> Result<Vec<Server>, BinaryLaneError> {
        self.client
            .get_keyed(&format!("servers/{server_id}/neighbors"), "servers")
            .await
    }

    async fn nested_list<T: serde::de::DeserializeOwned>(
        &self,
        server_id: u64,
        key: &str,
        opts: ListOptions,
    ) -> Result<Vec<T>, BinaryLaneError> {
        let path = format!("servers/{server_id}/{key}");
        fetch_all(opts, |o| self.client.get_page(&path, key, &[], o)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_with_networks() -> Server {
        Server {
            networks: Some(Networks {
                v4: vec![
                    NetworkV4 {
                        ip_address: "192.168.0.1".to_string(),
                        network_type: "public".to_string(),
                        ..NetworkV4::default()
                    },
                    NetworkV4 {
                        ip_address: "10.0.0.1".to_string(),
                        network_type: "private".to_string(),
                        ..NetworkV4::default()
                    },
                ],
                v6: vec![NetworkV6 {
                    ip_address: "1000:1000:1000:1000:0000:0000:004D:B001".to_string(),
                    network_type: "public".to_string(),
                    ..NetworkV6::default()
                }],
            }),
            ..Server::default()
        }
    }

    #[test]
    fn ip_helpers_pick_by_network_type() {
        let server = server_with_networks();
        assert_eq!(server.public_ipv4(), Some("192.168.0.1"));
        assert_eq!(server.private_ipv4(), Some("10.0.0.1"));
        assert_eq!(
            server.public_ipv6(),
            Some("1000:1000:1000:1000:0000:0000:004D:B001")
        );
    }

    #[test]
    fn ip_helpers_without_networks() {
        assert_eq!(Server::default().public_ipv4(), None);
        assert_eq!(Server::default().public_ipv6(), None);
    }

    #[test]
    fn create_image_serializes_as_id_or_slug() {
        let by_id = serde_json::to_value(ServerCreateImage::Id(1)).ok();
        let by_slug = serde_json::to_value(ServerCreateImage::Slug("ubuntu-24.04".to_string())).ok();
        assert_eq!(by_id, Some(serde_json::json!(1)));
        assert_eq!(by_slug, Some(serde_json::json!("ubuntu-24.04")));
    }

    #[test]
    fn sparse_server_payload_decodes() {
        let server: Result<Server, _> = serde_json::from_str(r#"{"id":12345}"#);
        assert_eq!(server.map(|s| s.id).ok(), Some(12345));
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let server: Result<Server, _> = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "web-1",
                "created_at": null,
                "locked": null,
                "memory": null,
                "tags": null,
                "backup_ids": null,
                "region": null,
                "image": {"id": 3, "name": null, "slug": null, "type": null},
                "networks": {
                    "v4": [{"ip_address": "203.0.113.10", "netmask": null, "gateway": null, "type": "public"}],
                    "v6": null
                }
            }"#,
        );
        let server = server.ok();

        assert_eq!(server.as_ref().map(|s| s.created_at.as_str()), Some(""));
        assert_eq!(server.as_ref().map(|s| (s.locked, s.memory)), Some((false, 0)));
        assert_eq!(server.as_ref().map(|s| s.tags.len()), Some(0));
        assert_eq!(server.as_ref().and_then(|s| s.image.as_ref()).map(|i| i.id), Some(3));
        assert_eq!(server.as_ref().and_then(Server::public_ipv4), Some("203.0.113.10"));
        assert_eq!(server.as_ref().and_then(Server::public_ipv6), None);
    }

    #[test]
    fn kernel_with_null_version_decodes() {
        let kernel: Result<Kernel, _> = serde_json::from_str(r#"{"id":1,"name":"k","version":null}"#);
        assert_eq!(kernel.map(|k| k.version).ok().as_deref(), Some(""));
    }
}
