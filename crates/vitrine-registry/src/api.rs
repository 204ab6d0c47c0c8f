//! Wire-client capability.
//!
//! [`RegistryApi`] is the seam between the facade and whatever actually talks
//! to the registry. [`ClientConnector`] turns a per-call handle into one.

use async_trait::async_trait;
use vitrine_core::{ImageFilters, ImageMember, ImageMeta, ImageSummary, MemberData, SharedImage};

use crate::error::RegistryError;
use crate::handle::RegistryClientHandle;

/// Operations offered by the registry service.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Lists image summaries matching `filters`.
    async fn get_images(&self, filters: &ImageFilters)
        -> Result<Vec<ImageSummary>, RegistryError>;

    /// Lists full image records matching `filters`.
    async fn get_images_detailed(
        &self,
        filters: &ImageFilters,
    ) -> Result<Vec<ImageMeta>, RegistryError>;

    /// Fetches one image record.
    async fn get_image(&self, image_id: &str) -> Result<ImageMeta, RegistryError>;

    /// Creates an image record and returns it with its assigned id.
    async fn add_image(&self, meta: &ImageMeta) -> Result<ImageMeta, RegistryError>;

    /// Updates an image record.
    ///
    /// With `purge_props`, custom properties missing from `meta` are removed
    /// instead of kept.
    async fn update_image(
        &self,
        image_id: &str,
        meta: &ImageMeta,
        purge_props: bool,
    ) -> Result<ImageMeta, RegistryError>;

    /// Deletes an image record and returns the deleted record.
    async fn delete_image(&self, image_id: &str) -> Result<ImageMeta, RegistryError>;

    /// Lists members of an image.
    async fn get_image_members(&self, image_id: &str) -> Result<Vec<ImageMember>, RegistryError>;

    /// Lists images shared with a member.
    async fn get_member_images(&self, member_id: &str) -> Result<Vec<SharedImage>, RegistryError>;

    /// Replaces the whole membership list of an image.
    async fn replace_members(
        &self,
        image_id: &str,
        member_data: &MemberData,
    ) -> Result<(), RegistryError>;

    /// Adds or updates one membership entry.
    async fn add_member(
        &self,
        image_id: &str,
        member_id: &str,
        can_share: Option<bool>,
    ) -> Result<(), RegistryError>;

    /// Removes one membership entry.
    async fn delete_member(&self, image_id: &str, member_id: &str) -> Result<(), RegistryError>;
}

/// Builds a wire client from a per-call handle.
pub trait ClientConnector: Send + Sync {
    /// The wire client type produced.
    type Client: RegistryApi;

    /// Connects using `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed, for example
    /// when TLS material is unreadable.
    fn connect(&self, handle: RegistryClientHandle) -> Result<Self::Client, RegistryError>;
}
