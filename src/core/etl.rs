use crate::core::extractor::Extractor;
use crate::core::transformer::{TransformSummary, Transformer};
use crate::core::{PlaylistSource, Storage};
use crate::utils::error::Result;

/// Runs both stages back to back against the same storage, standing in for
/// the schedule → object-created trigger chain when there is no trigger runtime.
pub struct EtlEngine<S: Storage, P: PlaylistSource> {
    extractor: Extractor<S, P>,
    transformer: Transformer<S>,
}

impl<S: Storage, P: PlaylistSource> EtlEngine<S, P> {
    pub fn new(extractor: Extractor<S, P>, transformer: Transformer<S>) -> Self {
        Self {
            extractor,
            transformer,
        }
    }

    pub async fn run(&self) -> Result<TransformSummary> {
        tracing::info!("Starting ETL process...");

        let staged = self.extractor.run().await?;
        tracing::info!("Staged raw payload at {}", staged);

        let summary = self.transformer.run(&staged).await?;
        tracing::info!(
            "ETL process finished: {} albums, {} artists, {} songs",
            summary.albums,
            summary.artists,
            summary.songs
        );
        Ok(summary)
    }
}
