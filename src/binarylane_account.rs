//! Account information.
//!
//! REST endpoint:
//! - GET `/account` -> `{"account": {...}}`

use serde::{Deserialize, Serialize};

use crate::binarylane_client::{BinaryLaneClient, null_as_default};
use crate::binarylane_error::BinaryLaneError;

/// The authenticated account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Maximum number of servers.
    #[serde(deserialize_with = "null_as_default")]
    pub server_limit: u32,
    /// Maximum number of floating IPs.
    #[serde(deserialize_with = "null_as_default")]
    pub floating_ip_limit: u32,
    /// Maximum number of volumes.
    #[serde(deserialize_with = "null_as_default")]
    pub volume_limit: u32,
    /// Account e-mail.
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// Account UUID.
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Whether the e-mail is verified.
    #[serde(deserialize_with = "null_as_default")]
    pub email_verified: bool,
    /// Account status ("active", "warning", "locked").
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Explanation of a non-active status.
    #[serde(deserialize_with = "null_as_default")]
    pub status_message: String,
}

/// Account endpoints.
pub struct AccountService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> AccountService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// Get the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get(&self) -> Result<Account, BinaryLaneError> {
        self.client.get_keyed("account", "account").await
    }
}
