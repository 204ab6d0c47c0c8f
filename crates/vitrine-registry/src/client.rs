//! HTTP client for the registry REST API.
//!
//! This module provides the concrete [`RegistryApi`] implementation used in
//! production, built from a [`RegistryClientHandle`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;
use vitrine_core::{
    ImageFilters, ImageMember, ImageMeta, ImageSummary, LocationCipher, MemberData, SharedImage,
};

use crate::api::{ClientConnector, RegistryApi};
use crate::config::TransportConfig;
use crate::error::RegistryError;
use crate::handle::RegistryClientHandle;

/// Header carrying the caller's token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Header telling the registry whether to drop unlisted properties.
pub const PURGE_PROPS_HEADER: &str = "x-glance-registry-purge-props";

#[derive(Deserialize)]
struct ImagesBody<T> {
    images: Vec<T>,
}

#[derive(Serialize, Deserialize)]
struct ImageBody {
    image: ImageMeta,
}

#[derive(Deserialize)]
struct MembersBody {
    members: Vec<ImageMember>,
}

#[derive(Deserialize)]
struct SharedImagesBody {
    shared_images: Vec<SharedImage>,
}

#[derive(Serialize)]
struct MemberFlags {
    can_share: bool,
}

#[derive(Serialize)]
struct MemberBody {
    member: MemberFlags,
}

/// Client for the registry's HTTP API.
pub struct HttpRegistryClient {
    base_url: Url,
    http: reqwest::Client,
    auth_token: Option<String>,
    cipher: Option<LocationCipher>,
}

impl HttpRegistryClient {
    /// Creates a client from a per-call handle.
    ///
    /// # Errors
    ///
    /// Returns an error if TLS material cannot be read or parsed, the base
    /// URL is invalid, or the encryption key is empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vitrine_core::RequestContext;
    /// use vitrine_registry::{
    ///     HttpRegistryClient, RegistryClientConfig, RegistryClientHandle, TransportConfig,
    /// };
    ///
    /// let config = RegistryClientConfig::new(TransportConfig::new("registry.local", 9191));
    /// let handle = RegistryClientHandle::new(&config, &RequestContext::with_token("tok"));
    /// let client = HttpRegistryClient::new(handle)?;
    /// # Ok::<(), vitrine_registry::RegistryError>(())
    /// ```
    pub fn new(handle: RegistryClientHandle) -> Result<Self, RegistryError> {
        let transport = handle.transport();
        let raw_url = transport.base_url();
        let base_url = Url::parse(&raw_url).map_err(|_| RegistryError::InvalidUrl { url: raw_url })?;
        let http = Self::build_http_client(transport)?;

        let cipher = handle
            .encryption_key()
            .map(crate::config::EncryptionKey::cipher)
            .transpose()?;

        Ok(Self {
            base_url,
            http,
            auth_token: handle.auth_token().map(ToString::to_string),
            cipher,
        })
    }

    /// Returns the registry base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(transport: &TransportConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("vitrine-registry/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = transport.timeout {
            builder = builder.timeout(timeout);
        }

        if transport.use_ssl() {
            if transport.insecure {
                builder = builder.danger_accept_invalid_certs(true);
            }

            if let Some(ref ca_file) = transport.ca_file {
                let cert_pem = std::fs::read(ca_file).map_err(|e| RegistryError::Io {
                    path: ca_file.clone(),
                    source: e,
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem).map_err(|e| {
                    RegistryError::Tls {
                        message: format!("Invalid CA certificate: {e}"),
                    }
                })?;
                builder = builder.add_root_certificate(cert);
            }

            match (&transport.cert_file, &transport.key_file) {
                (Some(cert_path), Some(key_path)) => {
                    let mut pem = std::fs::read(cert_path).map_err(|e| RegistryError::Io {
                        path: cert_path.clone(),
                        source: e,
                    })?;
                    let key_pem = std::fs::read(key_path).map_err(|e| RegistryError::Io {
                        path: key_path.clone(),
                        source: e,
                    })?;
                    pem.extend_from_slice(&key_pem);

                    let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                        RegistryError::Tls {
                            message: format!("Invalid client certificate: {e}"),
                        }
                    })?;
                    builder = builder.identity(identity);
                }
                (None, None) => {}
                _ => {
                    return Err(RegistryError::Tls {
                        message: "client certificate and key must be configured together"
                            .to_string(),
                    });
                }
            }
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: transport.base_url(),
            source: e,
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RegistryError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.auth_token {
            Some(ref token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn send(request: RequestBuilder, resource: &str) -> Result<Response, RegistryError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), resource, "Registry request failed");
        Err(RegistryError::from_status(status.as_u16(), resource, message))
    }

    /// Encrypts the location of an outgoing record.
    fn seal(&self, meta: &ImageMeta) -> Result<ImageMeta, RegistryError> {
        let mut meta = meta.clone();
        if let (Some(cipher), Some(location)) = (&self.cipher, meta.location.as_deref()) {
            meta.location = Some(cipher.encrypt(location)?);
        }
        Ok(meta)
    }

    /// Decrypts the location of an incoming record.
    fn open(&self, mut meta: ImageMeta) -> Result<ImageMeta, RegistryError> {
        if let (Some(cipher), Some(location)) = (&self.cipher, meta.location.as_deref()) {
            meta.location = Some(cipher.decrypt(location)?);
        }
        Ok(meta)
    }

    async fn image_call(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<ImageMeta, RegistryError> {
        let body: ImageBody = Self::send(request, resource).await?.json().await?;
        self.open(body.image)
    }
}

#[async_trait]
impl RegistryApi for HttpRegistryClient {
    async fn get_images(
        &self,
        filters: &ImageFilters,
    ) -> Result<Vec<ImageSummary>, RegistryError> {
        let request = self
            .request(Method::GET, self.url(&["images"])?)
            .query(&filters.to_query());
        let body: ImagesBody<ImageSummary> = Self::send(request, "images").await?.json().await?;
        Ok(body.images)
    }

    async fn get_images_detailed(
        &self,
        filters: &ImageFilters,
    ) -> Result<Vec<ImageMeta>, RegistryError> {
        let request = self
            .request(Method::GET, self.url(&["images", "detail"])?)
            .query(&filters.to_query());
        let body: ImagesBody<ImageMeta> = Self::send(request, "images").await?.json().await?;
        body.images.into_iter().map(|m| self.open(m)).collect()
    }

    async fn get_image(&self, image_id: &str) -> Result<ImageMeta, RegistryError> {
        let request = self.request(Method::GET, self.url(&["images", image_id])?);
        self.image_call(request, &format!("image {image_id}")).await
    }

    async fn add_image(&self, meta: &ImageMeta) -> Result<ImageMeta, RegistryError> {
        let body = ImageBody {
            image: self.seal(meta)?,
        };
        let request = self
            .request(Method::POST, self.url(&["images"])?)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        self.image_call(request, "images").await
    }

    async fn update_image(
        &self,
        image_id: &str,
        meta: &ImageMeta,
        purge_props: bool,
    ) -> Result<ImageMeta, RegistryError> {
        let body = ImageBody {
            image: self.seal(meta)?,
        };
        let request = self
            .request(Method::PUT, self.url(&["images", image_id])?)
            .header(CONTENT_TYPE, "application/json")
            .header(PURGE_PROPS_HEADER, if purge_props { "true" } else { "false" })
            .json(&body);
        self.image_call(request, &format!("image {image_id}")).await
    }

    async fn delete_image(&self, image_id: &str) -> Result<ImageMeta, RegistryError> {
        let request = self.request(Method::DELETE, self.url(&["images", image_id])?);
        self.image_call(request, &format!("image {image_id}")).await
    }

    async fn get_image_members(&self, image_id: &str) -> Result<Vec<ImageMember>, RegistryError> {
        let request = self.request(Method::GET, self.url(&["images", image_id, "members"])?);
        let body: MembersBody = Self::send(request, &format!("image {image_id}"))
            .await?
            .json()
            .await?;
        Ok(body.members)
    }

    async fn get_member_images(&self, member_id: &str) -> Result<Vec<SharedImage>, RegistryError> {
        let request = self.request(Method::GET, self.url(&["shared-images", member_id])?);
        let body: SharedImagesBody = Self::send(request, &format!("member {member_id}"))
            .await?
            .json()
            .await?;
        Ok(body.shared_images)
    }

    async fn replace_members(
        &self,
        image_id: &str,
        member_data: &MemberData,
    ) -> Result<(), RegistryError> {
        let request = self
            .request(Method::PUT, self.url(&["images", image_id, "members"])?)
            .header(CONTENT_TYPE, "application/json")
            .json(member_data);
        Self::send(request, &format!("image {image_id}")).await?;
        Ok(())
    }

    async fn add_member(
        &self,
        image_id: &str,
        member_id: &str,
        can_share: Option<bool>,
    ) -> Result<(), RegistryError> {
        let mut request = self.request(
            Method::PUT,
            self.url(&["images", image_id, "members", member_id])?,
        );
        if let Some(can_share) = can_share {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .json(&MemberBody {
                    member: MemberFlags { can_share },
                });
        }
        Self::send(request, &format!("membership {image_id}/{member_id}")).await?;
        Ok(())
    }

    async fn delete_member(&self, image_id: &str, member_id: &str) -> Result<(), RegistryError> {
        let request = self.request(
            Method::DELETE,
            self.url(&["images", image_id, "members", member_id])?,
        );
        Self::send(request, &format!("membership {image_id}/{member_id}")).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HttpRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRegistryClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.auth_token.is_some())
            .field("encrypts_locations", &self.cipher.is_some())
            .finish_non_exhaustive()
    }
}

/// Connector producing [`HttpRegistryClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl ClientConnector for HttpConnector {
    type Client = HttpRegistryClient;

    fn connect(&self, handle: RegistryClientHandle) -> Result<Self::Client, RegistryError> {
        HttpRegistryClient::new(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EncryptionKey, Protocol, RegistryClientConfig};
    use vitrine_core::RequestContext;

    fn handle(config: &RegistryClientConfig) -> RegistryClientHandle {
        RegistryClientHandle::new(config, &RequestContext::with_token("tok"))
    }

    #[test]
    fn test_client_creation() {
        let config = RegistryClientConfig::new(TransportConfig::new("registry.local", 9191));
        let client = HttpRegistryClient::new(handle(&config)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://registry.local:9191/");
    }

    #[test]
    fn test_url_encodes_segments() {
        let config = RegistryClientConfig::new(TransportConfig::new("registry.local", 9191));
        let client = HttpRegistryClient::new(handle(&config)).unwrap();
        let url = client.url(&["images", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://registry.local:9191/images/a%20b%2Fc");
    }

    #[test]
    fn test_missing_ca_file_is_io_error() {
        let transport = TransportConfig::new("registry.local", 443)
            .with_protocol(Protocol::Https)
            .with_ca_file("/nonexistent/ca.pem");
        let config = RegistryClientConfig::new(transport);
        let err = HttpRegistryClient::new(handle(&config)).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_tls_files_ignored_for_plain_http() {
        let transport = TransportConfig::new("registry.local", 80).with_ca_file("/nonexistent/ca.pem");
        let config = RegistryClientConfig::new(transport);
        assert!(HttpRegistryClient::new(handle(&config)).is_ok());
    }

    #[test]
    fn test_empty_encryption_key_rejected() {
        let config = RegistryClientConfig::new(TransportConfig::new("registry.local", 9191))
            .with_encryption_key(EncryptionKey::new(""));
        let err = HttpRegistryClient::new(handle(&config)).unwrap_err();
        assert!(matches!(err, RegistryError::Location(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = RegistryClientConfig::new(TransportConfig::new("registry.local", 9191));
        let client = HttpRegistryClient::new(handle(&config)).unwrap();
        assert!(!format!("{client:?}").contains("tok"));
    }
}
