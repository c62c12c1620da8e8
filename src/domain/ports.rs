use crate::domain::model::ArchiveScope;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Blob storage addressed by `/`-separated keys whose first segment is the
/// logical container (`rawdata`, `transformeddata`).
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Every object key under `prefix`, sorted.
    fn list_files(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    /// Fails with `ObjectNotFound` when `from` does not exist.
    fn copy_file(
        &self,
        from: &str,
        to: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Returns `false` when the object was already gone.
    fn delete_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// The music-streaming API, reduced to the one call the extractor needs.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// First page of the playlist's tracks: the response body, byte for byte.
    async fn fetch_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<u8>>;
}

pub trait ConfigProvider: Send + Sync {
    fn playlist_link(&self) -> &str;
    fn archive_scope(&self) -> ArchiveScope;
}
