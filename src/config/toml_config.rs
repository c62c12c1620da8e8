use crate::config::PipelineSettings;
use crate::core::ArchiveScope;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every key is optional; absent keys keep the
/// lower layer's value.
///
/// ```toml
/// [source]
/// playlist_link = "https://open.spotify.com/playlist/5ABHKGoOzxkaa28ttQV9sE"
/// client_id = "${SPOTIFY_CLIENT_ID}"
/// client_secret = "${SPOTIFY_CLIENT_SECRET}"
///
/// [storage]
/// target = "./storage"
///
/// [archive]
/// scope = "sweep"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub playlist_link: Option<String>,
    pub accounts_endpoint: Option<String>,
    pub api_endpoint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub scope: Option<ArchiveScope>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables become
    /// empty strings so an unset secret reads as missing, not as a literal.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static env var pattern")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        })
        .into_owned()
    }

    /// Overlays every key present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut PipelineSettings) {
        fn non_empty(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
        }

        if let Some(link) = non_empty(&self.source.playlist_link) {
            settings.playlist_link = link;
        }
        if let Some(endpoint) = non_empty(&self.source.accounts_endpoint) {
            settings.accounts_endpoint = endpoint;
        }
        if let Some(endpoint) = non_empty(&self.source.api_endpoint) {
            settings.api_endpoint = endpoint;
        }
        if let Some(id) = non_empty(&self.source.client_id) {
            settings.client_id = Some(id);
        }
        if let Some(secret) = non_empty(&self.source.client_secret) {
            settings.client_secret = Some(secret);
        }
        if let Some(target) = non_empty(&self.storage.target) {
            settings.storage_target = Some(target);
        }
        if let Some(scope) = self.archive.scope {
            settings.archive_scope = scope;
        }
    }
}
