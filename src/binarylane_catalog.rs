//! Regions and sizes: the catalog a server is built from.
//!
//! REST endpoints:
//! - GET `/regions` -> `{"regions": [...], "links": ..., "meta": ...}`
//! - GET `/sizes`   -> `{"sizes": [...], "links": ..., "meta": ...}`

use serde::{Deserialize, Serialize};

use crate::binarylane_client::{BinaryLaneClient, null_as_default};
use crate::binarylane_error::BinaryLaneError;
use crate::binarylane_pagination::{ListOptions, Page, fetch_all};

/// A data-center region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Region slug (e.g. "syd").
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Size slugs offered in this region.
    #[serde(deserialize_with = "null_as_default")]
    pub sizes: Vec<String>,
    /// Whether new servers can be created here.
    #[serde(deserialize_with = "null_as_default")]
    pub available: bool,
    /// Features offered in this region.
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<String>,
}

/// A server size (plan).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    /// Size slug.
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    /// Memory in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub memory: u64,
    /// Virtual CPU count.
    #[serde(deserialize_with = "null_as_default")]
    pub vcpus: u32,
    /// Disk size in GB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk: u64,
    /// Monthly transfer allowance in TB.
    #[serde(deserialize_with = "null_as_default")]
    pub transfer: f64,
    /// Monthly price.
    #[serde(deserialize_with = "null_as_default")]
    pub price_monthly: f64,
    /// Hourly price.
    #[serde(deserialize_with = "null_as_default")]
    pub price_hourly: f64,
    /// Region slugs offering this size.
    #[serde(deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    /// Whether the size can be ordered.
    #[serde(deserialize_with = "null_as_default")]
    pub available: bool,
    /// Human-readable description.
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// Region endpoints.
pub struct RegionsService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> RegionsService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// List regions.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list(&self, opts: ListOptions) -> Result<Vec<Region>, BinaryLaneError> {
        fetch_all(opts, |o| self.list_page(o)).await
    }

    /// Fetch one page of regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_page(&self, opts: ListOptions) -> Result<Page<Region>, BinaryLaneError> {
        self.client.get_page("regions", "regions", &[], opts).await
    }
}

/// Size endpoints.
pub struct SizesService<'a> {
    client: &'a BinaryLaneClient,
}

impl<'a> SizesService<'a> {
    pub(crate) const fn new(client: &'a BinaryLaneClient) -> Self {
        Self { client }
    }

    /// List sizes.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list(&self, opts: ListOptions) -> Result<Vec<Size>, BinaryLaneError> {
        fetch_all(opts, |o| self.list_page(o)).await
    }

    /// Fetch one page of sizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn list_page(&self, opts: ListOptions) -> Result<Page<Size>, BinaryLaneError> {
        self.client.get_page("sizes", "sizes", &[], opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_with_null_fields_decodes() {
        let region: Result<Region, _> =
            serde_json::from_str(r#"{"slug":"syd","name":null,"sizes":null,"available":null,"features":null}"#);
        assert_eq!(
            region.ok(),
            Some(Region {
                slug: "syd".to_string(),
                ..Region::default()
            })
        );
    }

    #[test]
    fn size_with_null_fields_decodes() {
        let size: Result<Size, _> = serde_json::from_str(
            r#"{"slug":"std-min","memory":1024,"transfer":null,"price_hourly":null,"regions":null,"description":null}"#,
        );
        let size = size.ok();

        assert_eq!(size.as_ref().map(|s| s.memory), Some(1024));
        assert_eq!(size.as_ref().map(|s| s.transfer), Some(0.0));
        assert_eq!(size.map(|s| s.regions.is_empty()), Some(true));
    }
}
