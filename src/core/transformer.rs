use crate::core::archive::{self, ArchiveReport};
use crate::core::layout::{self, OutputPaths};
use crate::core::projection::{dedup_by_key, project_albums, project_artists, project_songs};
use crate::core::tabular::{encode, upload_table};
use crate::domain::model::{ArchiveScope, PlaylistTracksPayload};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    pub source: String,
    pub outputs: OutputPaths,
    pub albums: usize,
    pub artists: usize,
    pub songs: usize,
    pub archive: ArchiveReport,
}

/// The object-triggered stage: staged payload in, three CSV tables out, then archive.
pub struct Transformer<S: Storage> {
    storage: S,
    scope: ArchiveScope,
}

impl<S: Storage> Transformer<S> {
    pub fn new(storage: S, scope: ArchiveScope) -> Self {
        Self { storage, scope }
    }

    pub fn from_config<C: ConfigProvider>(storage: S, config: &C) -> Self {
        Self::new(storage, config.archive_scope())
    }

    pub async fn run(&self, staging_path: &str) -> Result<TransformSummary> {
        self.run_at(staging_path, Utc::now()).await
    }

    pub async fn run_at(&self, staging_path: &str, now: DateTime<Utc>) -> Result<TransformSummary> {
        tracing::info!("🔧 Transforming {}", staging_path);

        let raw = self.storage.read_file(staging_path).await?;
        let payload: PlaylistTracksPayload =
            serde_json::from_slice(&raw).map_err(|source| EtlError::ParseError {
                object: staging_path.to_string(),
                source,
            })?;
        tracing::debug!("Parsed {} playlist entries", payload.items.len());

        let albums = dedup_by_key(project_albums(&payload));
        let artists = dedup_by_key(project_artists(&payload));
        let songs = dedup_by_key(project_songs(&payload));

        // 三張表都先序列化成功才開始上傳，避免留下部分輸出
        let album_table = encode(&albums)?;
        let artist_table = encode(&artists)?;
        let songs_table = encode(&songs)?;

        let outputs = self.claim_output_paths(now).await?;
        let albums = upload_table(&self.storage, &outputs.album, &album_table).await?;
        let artists = upload_table(&self.storage, &outputs.artist, &artist_table).await?;
        let songs = upload_table(&self.storage, &outputs.songs, &songs_table).await?;

        let archive = if layout::is_staging_path(staging_path) {
            archive::archive(&self.storage, self.scope, staging_path).await?
        } else {
            tracing::warn!(
                "⚠️ {} is outside the staging prefix, leaving it in place",
                staging_path
            );
            ArchiveReport::default()
        };

        let summary = TransformSummary {
            source: staging_path.to_string(),
            outputs,
            albums,
            artists,
            songs,
            archive,
        };

        if let Some(first) = summary.archive.failed.first() {
            return Err(EtlError::PartialArchiveError {
                object: first.clone(),
                reason: format!(
                    "{} of {} staged objects could not be archived",
                    summary.archive.failed.len(),
                    summary.archive.failed.len()
                        + summary.archive.archived.len()
                        + summary.archive.already_archived.len()
                ),
            });
        }

        tracing::info!(
            "✅ Transform complete: {} albums, {} artists, {} songs; {} archived",
            summary.albums,
            summary.artists,
            summary.songs,
            summary.archive.archived.len()
        );
        Ok(summary)
    }

    /// Output names for this run that no earlier run has written. Two runs
    /// within the same second would otherwise replace each other's tables.
    async fn claim_output_paths(&self, now: DateTime<Utc>) -> Result<OutputPaths> {
        let base = OutputPaths::at(now);
        let mut taken = Vec::new();
        for path in base.all() {
            let stem = path.trim_end_matches(".csv");
            taken.extend(self.storage.list_files(stem).await?);
        }

        let mut sequence = 0;
        loop {
            let candidate = OutputPaths::with_sequence(now, sequence);
            if candidate.all().iter().all(|path| !taken.iter().any(|t| t == path)) {
                if sequence > 0 {
                    tracing::warn!(
                        "⚠️ Outputs for {} already exist, writing with suffix _{}",
                        layout::timestamp(now),
                        sequence
                    );
                }
                return Ok(candidate);
            }
            sequence += 1;
        }
    }
}
