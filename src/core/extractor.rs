use crate::core::layout;
use crate::domain::ports::{ConfigProvider, PlaylistSource, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_PLAYLIST_LINK: &str = "https://open.spotify.com/playlist/5ABHKGoOzxkaa28ttQV9sE";

/// Resolves a playlist id from a share link, a `spotify:playlist:` URI or a bare id.
pub fn playlist_id_from_link(link: &str) -> Result<String> {
    let link = link.trim();
    let invalid = |reason: &str| EtlError::InvalidConfigValueError {
        field: "playlist_link".to_string(),
        value: link.to_string(),
        reason: reason.to_string(),
    };

    let id = if let Some(id) = link.strip_prefix("spotify:playlist:") {
        id.to_string()
    } else if link.starts_with("http://") || link.starts_with("https://") {
        let url = Url::parse(link).map_err(|e| invalid(&format!("Invalid URL: {}", e)))?;
        let mut segments = url
            .path_segments()
            .ok_or_else(|| invalid("URL has no path"))?
            .filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some("playlist"), Some(id)) => id.to_string(),
            _ => return Err(invalid("Expected a /playlist/<id> link")),
        }
    } else {
        link.to_string()
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("Playlist id must be non-empty and alphanumeric"));
    }
    Ok(id)
}

#[derive(Deserialize)]
struct ItemCount {
    #[serde(default)]
    items: Vec<IgnoredAny>,
}

/// The timer-driven stage: fetch one page of playlist tracks and stage it verbatim.
pub struct Extractor<S: Storage, P: PlaylistSource> {
    storage: S,
    source: P,
    playlist_id: String,
}

impl<S: Storage, P: PlaylistSource> Extractor<S, P> {
    pub fn new(storage: S, source: P, playlist_link: &str) -> Result<Self> {
        Ok(Self {
            storage,
            source,
            playlist_id: playlist_id_from_link(playlist_link)?,
        })
    }

    pub fn from_config<C: ConfigProvider>(storage: S, source: P, config: &C) -> Result<Self> {
        Self::new(storage, source, config.playlist_link())
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub async fn run(&self) -> Result<String> {
        self.run_at(Utc::now()).await
    }

    /// Returns the staging path written. Nothing is written unless the fetch succeeded.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<String> {
        tracing::info!("🎵 Extracting tracks for playlist {}", self.playlist_id);

        let data = self.source.fetch_playlist_tracks(&self.playlist_id).await?;
        // 原樣寫入；只確認是 JSON 並數一下項目
        let item_count = serde_json::from_slice::<ItemCount>(&data)
            .map_err(|source| EtlError::ParseError {
                object: format!("playlist {} response", self.playlist_id),
                source,
            })?
            .items
            .len();
        tracing::info!(
            "✅ Playlist data extracted: {} items, {} bytes",
            item_count,
            data.len()
        );

        let path = layout::staging_path(now);
        self.storage.write_file(&path, &data).await?;

        tracing::info!("📤 Uploaded raw payload to {}", path);
        Ok(path)
    }
}
