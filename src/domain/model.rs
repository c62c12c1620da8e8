use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The playlist-tracks document as returned by the API. Only the fields the
/// projections read are modelled; the raw bytes are what gets staged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistTracksPayload {
    #[serde(default)]
    pub items: Vec<TrackEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEntry {
    #[serde(default)]
    pub added_at: Option<String>,
    /// `null` for tracks that were removed from the catalogue.
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: i64,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub album: Album,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub is_local: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<i64>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// A flat row written to one of the output tables.
///
/// `HEADERS` fixes the column order; it must match the field order of the
/// implementing struct because rows are serialized positionally.
pub trait TableRecord: Serialize + DeserializeOwned {
    const TABLE: &'static str;
    const HEADERS: &'static [&'static str];

    fn natural_key(&self) -> &str;
}

// `None` in any optional column means "absent or unparseable", never zero or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub album_id: String,
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub total_tracks: Option<i64>,
    pub url: Option<String>,
}

impl TableRecord for AlbumRecord {
    const TABLE: &'static str = "album";
    const HEADERS: &'static [&'static str] =
        &["album_id", "name", "release_date", "total_tracks", "url"];

    fn natural_key(&self) -> &str {
        &self.album_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub artist_name: String,
    pub external_url: Option<String>,
}

impl TableRecord for ArtistRecord {
    const TABLE: &'static str = "artist";
    const HEADERS: &'static [&'static str] = &["artist_id", "artist_name", "external_url"];

    fn natural_key(&self) -> &str {
        &self.artist_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub song_name: String,
    pub duration_ms: i64,
    pub url: Option<String>,
    pub popularity: Option<i64>,
    pub song_added: Option<DateTime<Utc>>,
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
}

impl TableRecord for SongRecord {
    const TABLE: &'static str = "songs";
    const HEADERS: &'static [&'static str] = &[
        "song_id",
        "song_name",
        "duration_ms",
        "url",
        "popularity",
        "song_added",
        "album_id",
        "artist_id",
    ];

    fn natural_key(&self) -> &str {
        &self.song_id
    }
}

/// Which staging objects a transform run archives once its outputs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveScope {
    /// Only the object whose arrival triggered the run.
    #[default]
    TriggeringObject,
    /// Every object currently under the staging prefix.
    Sweep,
}

impl std::str::FromStr for ArchiveScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "triggering_object" | "object" | "single" => Ok(ArchiveScope::TriggeringObject),
            "sweep" | "all" => Ok(ArchiveScope::Sweep),
            other => Err(format!(
                "unknown archive scope '{}', expected 'triggering_object' or 'sweep'",
                other
            )),
        }
    }
}
