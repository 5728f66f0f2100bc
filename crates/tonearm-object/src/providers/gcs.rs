//! Google Cloud Storage provider.
//!
//! Objects go through [`object_store::gcp::GoogleCloudStorageBuilder`].
//! Bucket listing and creation are not part of [`ObjectStore`], so they use
//! the GCS JSON API directly:
//!
//! - `GET  {endpoint}/storage/v1/b?project={project}&prefix={prefix}`
//! - `POST {endpoint}/storage/v1/b?project={project}` with `{"name": ...}`
//!
//! A `409 Conflict` on creation means the bucket already exists.
//!
//! Those requests carry a bearer token from the same credential chain the
//! object store uses (service account file or ambient credentials), unless
//! an explicit access token is configured.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use object_store::gcp::{GcpCredentialProvider, GoogleCloudStorageBuilder};
use object_store::{ClientOptions, CredentialProvider, ObjectStore};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{BucketProvider, validate_bucket_name};
use crate::TRACING_TARGET_PROVIDER;
use crate::types::{BucketCreation, Error, Result, from_object_store};

/// Public GCS endpoint.
const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Bucket name used only to resolve credentials; never requested.
const CREDENTIAL_BUCKET: &str = "tonearm-credentials";

/// Configuration for the GCS provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct GcsConfig {
    /// Project that owns the buckets
    #[cfg_attr(feature = "config", arg(long = "gcs-project-id", env = "GCS_PROJECT_ID"))]
    pub project_id: String,

    /// Path to a service account key file (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-service-account-path", env = "GCS_SERVICE_ACCOUNT_PATH")
    )]
    #[serde(default)]
    pub service_account_path: Option<PathBuf>,

    /// OAuth2 bearer token overriding resolved credentials for bucket
    /// administration (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-access-token", env = "GCS_ACCESS_TOKEN")
    )]
    #[serde(default)]
    pub access_token: Option<String>,

    /// Custom endpoint, e.g. a local GCS emulator (optional)
    #[cfg_attr(feature = "config", arg(long = "gcs-endpoint", env = "GCS_ENDPOINT"))]
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl GcsConfig {
    /// Creates a configuration for `project_id` with default credentials.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            service_account_path: None,
            access_token: None,
            endpoint: None,
        }
    }

    /// Set the service account key file.
    #[must_use]
    pub fn with_service_account_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.service_account_path = Some(path.into());
        self
    }

    /// Set a bearer token for bucket administration instead of resolving
    /// one from the credential chain.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set a custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Returns the endpoint without a trailing slash.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(Error::invalid_config("GCS project id cannot be empty"));
        }

        let endpoint = self.endpoint();
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(Error::invalid_config(format!(
                "invalid GCS endpoint: {endpoint}"
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for GcsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsConfig")
            .field("project_id", &self.project_id)
            .field("service_account_path", &self.service_account_path)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Non-success response from the GCS JSON API.
#[derive(Debug, thiserror::Error)]
#[error("GCS API returned {status}: {message}")]
struct GcsApiError {
    status: StatusCode,
    message: String,
}

impl GcsApiError {
    fn is_retryable(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[derive(Debug, Deserialize)]
struct BucketList {
    #[serde(default)]
    items: Vec<BucketResource>,
}

#[derive(Debug, Deserialize)]
struct BucketResource {
    name: String,
}

#[derive(Debug, Serialize)]
struct NewBucket<'a> {
    name: &'a str,
}

/// Google Cloud Storage buckets within one project.
#[derive(Debug, Clone)]
pub struct GcsProvider {
    config: GcsConfig,
    http: reqwest::Client,
    credentials: Arc<OnceCell<GcpCredentialProvider>>,
}

impl GcsProvider {
    /// Creates a provider for the configured project.
    pub fn new(config: GcsConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(
            target: TRACING_TARGET_PROVIDER,
            project = %config.project_id,
            endpoint = %config.endpoint(),
            "GCS provider initialized"
        );

        Ok(Self {
            config,
            http,
            credentials: Arc::default(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GcsConfig {
        &self.config
    }

    fn buckets_url(&self) -> String {
        format!("{}/storage/v1/b", self.config.endpoint())
    }

    fn store_builder(&self, bucket: &str) -> GoogleCloudStorageBuilder {
        let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);

        if let Some(path) = &self.config.service_account_path {
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        if let Some(endpoint) = &self.config.endpoint {
            builder = builder.with_url(endpoint.trim_end_matches('/'));
            if endpoint.starts_with("http://") {
                builder = builder.with_client_options(ClientOptions::new().with_allow_http(true));
            }
        }

        builder
    }

    /// Returns the bearer token for JSON API requests.
    ///
    /// The configured access token wins; otherwise the token comes from the
    /// credential provider object store resolves, which refreshes it.
    async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }

        let provider = self
            .credentials
            .get_or_try_init(|| async {
                let store = self
                    .store_builder(CREDENTIAL_BUCKET)
                    .build()
                    .map_err(|e| from_object_store("credentials", e))?;
                Ok::<_, Error>(store.credentials().clone())
            })
            .await?;

        let credential = provider
            .get_credential()
            .await
            .map_err(|e| from_object_store("credentials", e))?;

        Ok(credential.bearer.clone())
    }

    async fn request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self.bearer_token().await?;

        Ok(builder
            .query(&[("project", self.config.project_id.as_str())])
            .bearer_auth(token))
    }

    async fn api_error(operation: &'static str, response: reqwest::Response) -> Error {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        let err = GcsApiError { status, message };
        let retryable = err.is_retryable();

        tracing::error!(
            target: TRACING_TARGET_PROVIDER,
            operation,
            status = %status,
            error = %err,
            "GCS API request failed"
        );

        Error::backend(operation, err, retryable)
    }
}

fn transport_error(operation: &'static str, err: reqwest::Error) -> Error {
    let retryable = err.is_timeout() || err.is_connect();
    Error::backend(operation, err, retryable)
}

#[async_trait::async_trait]
impl BucketProvider for GcsProvider {
    fn id(&self) -> &'static str {
        "gcs"
    }

    async fn open(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        validate_bucket_name(bucket)?;

        let store = self
            .store_builder(bucket)
            .build()
            .map_err(|e| from_object_store("open_bucket", e))?;

        Ok(Arc::new(store))
    }

    async fn bucket_exists(&self, prefix: &str) -> Result<bool> {
        let request = self.request(self.http.get(self.buckets_url())).await?.query(&[
            ("prefix", prefix),
            ("maxResults", "1"),
            ("fields", "items/name"),
        ]);

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("bucket_exists", e))?;

        if !response.status().is_success() {
            return Err(Self::api_error("bucket_exists", response).await);
        }

        let list: BucketList = response
            .json()
            .await
            .map_err(|e| transport_error("bucket_exists", e))?;

        Ok(list.items.iter().any(|b| b.name.starts_with(prefix)))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation> {
        validate_bucket_name(bucket)?;

        let request = self
            .request(self.http.post(self.buckets_url()))
            .await?
            .json(&NewBucket { name: bucket });

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("create_bucket", e))?;

        match response.status() {
            StatusCode::CONFLICT => Ok(BucketCreation::AlreadyExists),
            status if status.is_success() => Ok(BucketCreation::Created),
            _ => Err(Self::api_error("create_bucket", response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_and_trims() {
        let config = GcsConfig::new("acme-audio");
        assert_eq!(config.endpoint(), "https://storage.googleapis.com");

        let config = config.with_endpoint("http://localhost:4443/");
        assert_eq!(config.endpoint(), "http://localhost:4443");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(GcsConfig::new(" ").validate().is_err());
        assert!(
            GcsConfig::new("acme")
                .with_endpoint("ftp://example.com")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn debug_redacts_token() {
        let config = GcsConfig::new("acme").with_access_token("ya29.secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn api_error_retryability() {
        let throttled = GcsApiError {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: String::new(),
        };
        let forbidden = GcsApiError {
            status: StatusCode::FORBIDDEN,
            message: String::new(),
        };
        assert!(throttled.is_retryable());
        assert!(!forbidden.is_retryable());
    }

    #[test]
    fn bucket_list_tolerates_missing_items() {
        let list: BucketList = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());

        let list: BucketList =
            serde_json::from_str(r#"{"items":[{"name":"audio-eu"}]}"#).unwrap();
        assert_eq!(list.items[0].name, "audio-eu");
    }

    #[tokio::test]
    async fn configured_access_token_is_used_as_is() {
        let provider = GcsProvider::new(
            GcsConfig::new("acme")
                .with_endpoint("http://localhost:4443")
                .with_access_token("ya29.token"),
        )
        .unwrap();

        assert_eq!(provider.bearer_token().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn token_comes_from_service_account_credentials() {
        let temp = tempfile::tempdir().unwrap();
        let provider = GcsProvider::new(
            GcsConfig::new("acme")
                .with_endpoint("http://localhost:4443")
                .with_service_account_path(temp.path().join("missing-key.json")),
        )
        .unwrap();

        // No token configured, so the service account file is consulted.
        assert!(provider.bearer_token().await.is_err());
        assert!(provider.bucket_exists("audio").await.is_err());
    }

    #[tokio::test]
    async fn open_rejects_invalid_bucket() {
        let provider =
            GcsProvider::new(GcsConfig::new("acme").with_endpoint("http://localhost:4443"))
                .unwrap();

        let err = provider.open("a/b").await.err().unwrap();
        assert!(matches!(err, Error::InvalidBucket { .. }));
    }
}
