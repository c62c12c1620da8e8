use crate::config::toml_config::TomlConfig;
use crate::config::PipelineSettings;
use crate::core::ArchiveScope;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "spotify-etl")]
#[command(about = "Extract a Spotify playlist into album, artist and song tables")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Optional TOML settings file; flags and environment variables take precedence
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Root directory holding the `rawdata/` and `transformeddata/` containers
    #[arg(long, env = "STORAGE_ROOT", global = true)]
    pub storage_root: Option<String>,

    #[arg(long, env = "PLAYLIST_LINK", global = true)]
    pub playlist_link: Option<String>,

    #[arg(long, env = "SPOTIFY_ACCOUNTS_ENDPOINT", global = true)]
    pub accounts_endpoint: Option<String>,

    #[arg(long, env = "SPOTIFY_API_ENDPOINT", global = true)]
    pub api_endpoint: Option<String>,

    /// `triggering_object` (default) or `sweep`
    #[arg(long, env = "ARCHIVE_SCOPE", global = true)]
    pub archive_scope: Option<ArchiveScope>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Fetch the playlist and stage the raw payload
    Extract,
    /// Transform one staged payload into CSV tables and archive it
    Transform {
        /// Storage key, e.g. rawdata/to_processed/spotify_raw_20240101_000000.json
        path: String,
    },
    /// Archive every object under the staging prefix
    Archive,
    /// Extract, then transform the object just staged
    Run,
}

impl CliConfig {
    /// Defaults, then the TOML file, then flags/environment.
    pub fn settings(&self) -> Result<PipelineSettings> {
        let mut settings = PipelineSettings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(link) = &self.playlist_link {
            settings.playlist_link = link.clone();
        }
        if let Some(endpoint) = &self.accounts_endpoint {
            settings.accounts_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.api_endpoint {
            settings.api_endpoint = endpoint.clone();
        }
        if let Some(scope) = self.archive_scope {
            settings.archive_scope = scope;
        }
        if self.client_id.is_some() {
            settings.client_id = self.client_id.clone();
        }
        if self.client_secret.is_some() {
            settings.client_secret = self.client_secret.clone();
        }
        if self.storage_root.is_some() {
            settings.storage_target = self.storage_root.clone();
        }

        Ok(settings)
    }
}
