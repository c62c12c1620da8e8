//! Pure projections from a playlist-tracks payload into flat records.
//!
//! The projections emit one row per occurrence; callers deduplicate with
//! [`dedup_by_key`]. Rows whose natural key is missing (local files, removed
//! tracks) are dropped, every other optional field maps to `None` when it is
//! absent or unparseable.

use crate::domain::model::{
    AlbumRecord, ArtistRecord, PlaylistTracksPayload, SongRecord, TableRecord, Track,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;

fn tracks(payload: &PlaylistTracksPayload) -> impl Iterator<Item = (Option<&str>, &Track)> {
    payload.items.iter().enumerate().filter_map(|(index, entry)| {
        match &entry.track {
            Some(track) if !track.is_local => Some((entry.added_at.as_deref(), track)),
            Some(_) => {
                tracing::debug!("Skipping local track at position {}", index);
                None
            }
            None => {
                tracing::warn!("⚠️ Playlist entry {} has no track, skipping", index);
                None
            }
        }
    })
}

pub fn project_albums(payload: &PlaylistTracksPayload) -> Vec<AlbumRecord> {
    tracks(payload)
        .filter_map(|(_, track)| {
            let album = &track.album;
            Some(AlbumRecord {
                album_id: album.id.clone()?,
                name: album.name.clone(),
                release_date: album.release_date.as_deref().and_then(parse_release_date),
                total_tracks: album.total_tracks,
                url: album.external_urls.spotify.clone(),
            })
        })
        .collect()
}

pub fn project_artists(payload: &PlaylistTracksPayload) -> Vec<ArtistRecord> {
    tracks(payload)
        .flat_map(|(_, track)| track.artists.iter())
        .filter_map(|artist| {
            Some(ArtistRecord {
                artist_id: artist.id.clone()?,
                artist_name: artist.name.clone(),
                external_url: artist.external_urls.spotify.clone(),
            })
        })
        .collect()
}

pub fn project_songs(payload: &PlaylistTracksPayload) -> Vec<SongRecord> {
    tracks(payload)
        .filter_map(|(added_at, track)| {
            Some(SongRecord {
                song_id: track.id.clone()?,
                song_name: track.name.clone(),
                duration_ms: track.duration_ms,
                url: track.external_urls.spotify.clone(),
                popularity: track.popularity,
                song_added: added_at.and_then(parse_added_at),
                album_id: track.album.id.clone(),
                // NOTE: links the album's first artist, not the track's own
                // primary artist. Kept as observed downstream; likely a bug.
                artist_id: track.album.artists.first().and_then(|a| a.id.clone()),
            })
        })
        .collect()
}

/// Keeps the first record seen for each natural key, preserving input order.
pub fn dedup_by_key<R: TableRecord>(records: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.natural_key().to_string()))
        .collect()
}

/// Album release dates come at day, month or year precision. Year `0000`
/// is the API's placeholder for "unknown".
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01-01", value), "%Y-%m-%d"))
        .ok()
        .filter(|date| date.year() > 0)
}

pub fn parse_added_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
