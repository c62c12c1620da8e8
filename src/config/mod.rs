#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::spotify::{SpotifyCredentials, DEFAULT_ACCOUNTS_ENDPOINT, DEFAULT_API_ENDPOINT};
use crate::core::extractor::{playlist_id_from_link, DEFAULT_PLAYLIST_LINK};
use crate::core::{ArchiveScope, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_required_field, validate_required_secret, validate_url, Validate,
};

/// Fully resolved pipeline settings, whatever layer they came from.
///
/// Credentials and the storage target stay optional here: only the stage
/// that needs them asks, so a transform can run without API credentials.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub playlist_link: String,
    pub accounts_endpoint: String,
    pub api_endpoint: String,
    pub archive_scope: ArchiveScope,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Local root directory or S3 bucket, depending on the binary.
    pub storage_target: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            playlist_link: DEFAULT_PLAYLIST_LINK.to_string(),
            accounts_endpoint: DEFAULT_ACCOUNTS_ENDPOINT.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            archive_scope: ArchiveScope::default(),
            client_id: None,
            client_secret: None,
            storage_target: None,
        }
    }
}

impl PipelineSettings {
    /// Both halves of the client-credentials pair, or `MissingConfigError`.
    pub fn credentials(&self) -> Result<SpotifyCredentials> {
        let client_id = validate_required_secret("spotify_client_id", &self.client_id)?;
        let client_secret = validate_required_secret("spotify_client_secret", &self.client_secret)?;
        Ok(SpotifyCredentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    pub fn storage_target(&self) -> Result<&str> {
        let target = validate_required_field("storage_target", &self.storage_target)?;
        validate_path("storage_target", target)?;
        Ok(target)
    }
}

impl ConfigProvider for PipelineSettings {
    fn playlist_link(&self) -> &str {
        &self.playlist_link
    }

    fn archive_scope(&self) -> ArchiveScope {
        self.archive_scope
    }
}

impl Validate for PipelineSettings {
    fn validate(&self) -> Result<()> {
        validate_url("accounts_endpoint", &self.accounts_endpoint)?;
        validate_url("api_endpoint", &self.api_endpoint)?;
        playlist_id_from_link(&self.playlist_link)?;
        if let Some(target) = &self.storage_target {
            validate_path("storage_target", target)?;
        }

        tracing::debug!("✅ Pipeline settings validation passed");
        Ok(())
    }
}
