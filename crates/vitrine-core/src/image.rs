//! Image metadata records and listing filters.
//!
//! The registry stores metadata only; image bytes live in a separate store
//! referenced by the (usually encrypted) [`ImageMeta::location`] field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lightweight entry returned by image listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    /// Image identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Disk format (e.g. "qcow2", "raw").
    #[serde(default)]
    pub disk_format: Option<String>,

    /// Container format (e.g. "bare", "ovf").
    #[serde(default)]
    pub container_format: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    /// Checksum of the image data.
    #[serde(default)]
    pub checksum: Option<String>,

    /// Lifecycle status (e.g. "queued", "active").
    #[serde(default)]
    pub status: Option<String>,
}

/// Full image metadata record.
///
/// Every attribute is optional so the same type serves as a partial update
/// payload and as a complete record returned by the registry.
///
/// # Examples
///
/// ```rust
/// use vitrine_core::ImageMeta;
///
/// let meta = ImageMeta::new()
///     .with_name("cirros")
///     .with_property("hw_disk_bus", "virtio");
///
/// assert!(meta.id.is_none());
/// assert_eq!(meta.properties.get("hw_disk_bus").map(String::as_str), Some("virtio"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    /// Image identifier, assigned by the registry on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Whether the image is visible to every tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,

    /// Disk format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_format: Option<String>,

    /// Container format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_format: Option<String>,

    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Checksum of the image data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Minimum disk size in gigabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<u64>,

    /// Minimum RAM in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<u64>,

    /// Owning tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Storage backend URI of the image data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Whether the image is protected from deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Deletion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Whether the record is soft-deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    /// Custom key/value properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl ImageMeta {
    /// Creates an empty metadata payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the image name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the disk format.
    #[must_use]
    pub fn with_disk_format(mut self, format: impl Into<String>) -> Self {
        self.disk_format = Some(format.into());
        self
    }

    /// Sets the container format.
    #[must_use]
    pub fn with_container_format(mut self, format: impl Into<String>) -> Self {
        self.container_format = Some(format.into());
        self
    }

    /// Sets the public visibility flag.
    #[must_use]
    pub const fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    /// Sets the storage location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Adds a custom property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDir {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::InvalidSortDir(s.to_string())),
        }
    }
}

/// Query options for image listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilters {
    /// Attribute filters (e.g. `status=active`).
    #[serde(default)]
    pub filters: BTreeMap<String, String>,

    /// Custom property filters, sent as `property-<name>`.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Id of the last image of the previous page.
    #[serde(default)]
    pub marker: Option<String>,

    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Attribute to sort by.
    #[serde(default)]
    pub sort_key: Option<String>,

    /// Sort direction.
    #[serde(default)]
    pub sort_dir: Option<SortDir>,
}

impl ImageFilters {
    /// Creates empty filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute filter.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Adds a custom property filter.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the paging marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the sort attribute and direction.
    #[must_use]
    pub fn with_sort(mut self, key: impl Into<String>, dir: SortDir) -> Self {
        self.sort_key = Some(key.into());
        self.sort_dir = Some(dir);
        self
    }

    /// Encodes the filters as query parameters.
    ///
    /// Attribute filters come first, then properties prefixed with
    /// `property-`, then paging and sorting keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_core::ImageFilters;
    ///
    /// let query = ImageFilters::new()
    ///     .with_filter("status", "active")
    ///     .with_property("os", "linux")
    ///     .to_query();
    /// assert_eq!(query, vec![
    ///     ("status".to_string(), "active".to_string()),
    ///     ("property-os".to_string(), "linux".to_string()),
    /// ]);
    /// ```
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        query.extend(
            self.properties
                .iter()
                .map(|(k, v)| (format!("property-{k}"), v.clone())),
        );

        if let Some(ref marker) = self.marker {
            query.push(("marker".to_string(), marker.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(ref key) = self.sort_key {
            query.push(("sort_key".to_string(), key.clone()));
        }
        if let Some(dir) = self.sort_dir {
            query.push(("sort_dir".to_string(), dir.to_string()));
        }

        query
    }
}

/// Parses a `key=value` argument.
///
/// # Errors
///
/// Returns an error if the input has no `=` or an empty key.
///
/// # Examples
///
/// ```
/// use vitrine_core::image::parse_key_value;
///
/// let (k, v) = parse_key_value("os=linux").unwrap();
/// assert_eq!((k.as_str(), v.as_str()), ("os", "linux"));
/// ```
pub fn parse_key_value(input: &str) -> Result<(String, String)> {
    let (key, value) = input.split_once('=').ok_or_else(|| Error::InvalidKeyValue {
        input: input.to_string(),
        reason: "missing '='".to_string(),
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidKeyValue {
            input: input.to_string(),
            reason: "empty key".to_string(),
        });
    }

    Ok((key.to_string(), value.to_string()))
}
