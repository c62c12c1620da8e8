//! Object-storage layout shared by both pipeline stages. Other tooling reads
//! these paths, so they are fixed rather than configurable.

use chrono::{DateTime, Utc};

pub const STAGING_PREFIX: &str = "rawdata/to_processed/";
pub const PROCESSED_PREFIX: &str = "rawdata/processed/";

pub const ALBUM_PREFIX: &str = "transformeddata/album_data/";
pub const ARTIST_PREFIX: &str = "transformeddata/artist_data/";
pub const SONGS_PREFIX: &str = "transformeddata/songs_data/";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `rawdata/to_processed/spotify_raw_<ts>.json`
pub fn staging_path(now: DateTime<Utc>) -> String {
    format!("{}spotify_raw_{}.json", STAGING_PREFIX, timestamp(now))
}

/// Output paths for one transform run; all three share the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub album: String,
    pub artist: String,
    pub songs: String,
}

impl OutputPaths {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_sequence(now, 0)
    }

    /// Sequence 0 is the plain name; later runs within the same second get `_<n>`.
    pub fn with_sequence(now: DateTime<Utc>, sequence: u32) -> Self {
        let ts = match sequence {
            0 => timestamp(now),
            n => format!("{}_{}", timestamp(now), n),
        };
        Self {
            album: format!("{}album_{}.csv", ALBUM_PREFIX, ts),
            artist: format!("{}artist_{}.csv", ARTIST_PREFIX, ts),
            songs: format!("{}songs_{}.csv", SONGS_PREFIX, ts),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.album, &self.artist, &self.songs]
    }
}

pub fn is_staging_path(path: &str) -> bool {
    path.strip_prefix(STAGING_PREFIX)
        .is_some_and(|name| !name.is_empty() && !name.ends_with('/'))
}

/// Mirrors a staging key under the processed prefix. `None` for keys outside staging.
pub fn processed_path_for(staging_path: &str) -> Option<String> {
    if !is_staging_path(staging_path) {
        return None;
    }
    staging_path
        .strip_prefix(STAGING_PREFIX)
        .map(|name| format!("{}{}", PROCESSED_PREFIX, name))
}
