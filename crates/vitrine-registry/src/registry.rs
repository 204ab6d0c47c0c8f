//! Client factory and delegation surface.
//!
//! [`Registry`] owns the current [`RegistryClientConfig`] and, for every
//! operation, builds a fresh [`RegistryClientHandle`] from it and the caller's
//! [`RequestContext`], connects a wire client, and forwards the call.
//! Results and errors come back unchanged.

use std::sync::Arc;

use figment::Figment;
use parking_lot::RwLock;
use vitrine_core::{
    ImageFilters, ImageMember, ImageMeta, ImageSummary, MemberData, RequestContext, SharedImage,
};

use crate::api::{ClientConnector, RegistryApi};
use crate::client::HttpConnector;
use crate::config::{self, AdminCredentials, RegistryClientConfig};
use crate::error::RegistryError;
use crate::handle::RegistryClientHandle;

/// Registry facade.
///
/// The config snapshot is swapped atomically on re-resolution; calls already
/// in flight keep the snapshot they started with.
#[derive(Debug)]
pub struct Registry<C = HttpConnector> {
    config: RwLock<Arc<RegistryClientConfig>>,
    connector: C,
}

impl Registry<HttpConnector> {
    /// Creates a facade backed by the HTTP client.
    #[must_use]
    pub fn new(config: RegistryClientConfig) -> Self {
        Self::with_connector(config, HttpConnector)
    }

    /// Resolves connection and credentials from `figment` and creates a
    /// facade backed by the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if the connection settings
    /// are missing or malformed.
    pub fn from_settings(figment: &Figment) -> Result<Self, RegistryError> {
        Ok(Self::new(RegistryClientConfig::resolve(figment)?))
    }
}

impl<C: ClientConnector> Registry<C> {
    /// Creates a facade with a custom connector.
    pub fn with_connector(config: RegistryClientConfig, connector: C) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            connector,
        }
    }

    /// Returns the current config snapshot.
    pub fn config(&self) -> Arc<RegistryClientConfig> {
        Arc::clone(&self.config.read())
    }

    /// Replaces the config snapshot.
    pub fn reconfigure(&self, config: RegistryClientConfig) {
        *self.config.write() = Arc::new(config);
    }

    /// Re-resolves transport and encryption key, keeping current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] on bad settings; the current
    /// snapshot is left untouched.
    pub fn resolve_connection(&self, figment: &Figment) -> Result<(), RegistryError> {
        let resolved = config::resolve_connection(figment)?;
        let mut guard = self.config.write();
        let next = RegistryClientConfig {
            credentials: guard.credentials.clone(),
            ..resolved
        };
        *guard = Arc::new(next);
        Ok(())
    }

    /// Re-resolves admin credentials, keeping transport and key.
    pub fn resolve_credentials(&self, figment: &Figment, env_auth_url: Option<&str>) {
        self.set_credentials(config::resolve_credentials(figment, env_auth_url));
    }

    /// Attaches admin credentials to the current snapshot.
    pub fn set_credentials(&self, credentials: AdminCredentials) {
        let mut guard = self.config.write();
        let next = RegistryClientConfig::clone(&guard).with_credentials(credentials);
        *guard = Arc::new(next);
    }

    /// Builds a handle for `ctx` from the current snapshot.
    ///
    /// Never fails and never changes the snapshot.
    pub fn build_client(&self, ctx: &RequestContext) -> RegistryClientHandle {
        RegistryClientHandle::new(&self.config(), ctx)
    }

    fn client(&self, ctx: &RequestContext) -> Result<C::Client, RegistryError> {
        self.connector.connect(self.build_client(ctx))
    }

    /// Lists image summaries.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn list_images(
        &self,
        ctx: &RequestContext,
        filters: &ImageFilters,
    ) -> Result<Vec<ImageSummary>, RegistryError> {
        self.client(ctx)?.get_images(filters).await
    }

    /// Lists full image records.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn list_images_detailed(
        &self,
        ctx: &RequestContext,
        filters: &ImageFilters,
    ) -> Result<Vec<ImageMeta>, RegistryError> {
        self.client(ctx)?.get_images_detailed(filters).await
    }

    /// Fetches one image record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] from the wire client if the id
    /// does not resolve; other failures propagate unchanged.
    pub async fn get_image_metadata(
        &self,
        ctx: &RequestContext,
        image_id: &str,
    ) -> Result<ImageMeta, RegistryError> {
        self.client(ctx)?.get_image(image_id).await
    }

    /// Creates an image record.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn add_image_metadata(
        &self,
        ctx: &RequestContext,
        meta: &ImageMeta,
    ) -> Result<ImageMeta, RegistryError> {
        tracing::debug!("Adding image metadata");
        self.client(ctx)?.add_image(meta).await
    }

    /// Updates an image record.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn update_image_metadata(
        &self,
        ctx: &RequestContext,
        image_id: &str,
        meta: &ImageMeta,
        purge_props: bool,
    ) -> Result<ImageMeta, RegistryError> {
        tracing::debug!(image_id, purge_props, "Updating image metadata");
        self.client(ctx)?
            .update_image(image_id, meta, purge_props)
            .await
    }

    /// Deletes an image record.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn delete_image_metadata(
        &self,
        ctx: &RequestContext,
        image_id: &str,
    ) -> Result<ImageMeta, RegistryError> {
        tracing::debug!(image_id, "Deleting image metadata");
        self.client(ctx)?.delete_image(image_id).await
    }

    /// Lists members of an image.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn get_image_members(
        &self,
        ctx: &RequestContext,
        image_id: &str,
    ) -> Result<Vec<ImageMember>, RegistryError> {
        self.client(ctx)?.get_image_members(image_id).await
    }

    /// Lists images shared with a member.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn get_member_images(
        &self,
        ctx: &RequestContext,
        member_id: &str,
    ) -> Result<Vec<SharedImage>, RegistryError> {
        self.client(ctx)?.get_member_images(member_id).await
    }

    /// Replaces the membership list of an image.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn replace_members(
        &self,
        ctx: &RequestContext,
        image_id: &str,
        member_data: &MemberData,
    ) -> Result<(), RegistryError> {
        self.client(ctx)?
            .replace_members(image_id, member_data)
            .await
    }

    /// Adds or updates one membership entry.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        image_id: &str,
        member_id: &str,
        can_share: Option<bool>,
    ) -> Result<(), RegistryError> {
        self.client(ctx)?
            .add_member(image_id, member_id, can_share)
            .await
    }

    /// Removes one membership entry.
    ///
    /// # Errors
    ///
    /// Propagates wire-client failures unchanged.
    pub async fn delete_member(
        &self,
        ctx: &RequestContext,
        image_id: &str,
        member_id: &str,
    ) -> Result<(), RegistryError> {
        self.client(ctx)?.delete_member(image_id, member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthStrategy, TransportConfig};
    use figment::providers::Serialized;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::new(RegistryClientConfig::new(TransportConfig::new("h", 1)))
    }

    #[test]
    fn test_build_client_without_credentials() {
        let handle = registry().build_client(&RequestContext::with_token("t"));
        assert!(handle.credentials().is_none());
        assert_eq!(handle.auth_token(), Some("t"));
    }

    #[test]
    fn test_set_credentials_swaps_snapshot() {
        let registry = registry();
        let before = registry.config();

        registry.set_credentials(AdminCredentials::new(AuthStrategy::Keystone));

        assert!(before.credentials.is_none());
        let handle = registry.build_client(&RequestContext::anonymous());
        assert_eq!(
            handle.credentials().map(|c| c.strategy.clone()),
            Some(AuthStrategy::Keystone)
        );
    }

    #[test]
    fn test_failed_resolution_keeps_snapshot() {
        let registry = registry();
        let bad = Figment::from(Serialized::defaults(json!({"registry_port": "x"})));

        assert!(matches!(
            registry.resolve_connection(&bad),
            Err(RegistryError::Configuration { .. })
        ));
        assert_eq!(registry.config().transport.host, "h");
    }

    #[test]
    fn test_resolve_connection_keeps_credentials() {
        let registry = registry();
        registry.set_credentials(AdminCredentials::new(AuthStrategy::NoAuth));

        let good = Figment::from(Serialized::defaults(json!({
            "registry_host": "new-host",
            "registry_port": 9292,
        })));
        registry.resolve_connection(&good).unwrap();

        let config = registry.config();
        assert_eq!(config.transport.host, "new-host");
        assert!(config.credentials.is_some());
    }

    #[test]
    fn test_resolve_credentials_applies_override() {
        let registry = registry();
        let settings = Figment::from(Serialized::defaults(json!({"auth_strategy": "noauth"})));

        registry.resolve_credentials(&settings, Some("http://ks:5000/v3"));

        let creds = registry.config().credentials.clone().unwrap();
        assert_eq!(creds.strategy, AuthStrategy::Keystone);
    }
}
