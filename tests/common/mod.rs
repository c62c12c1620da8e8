#![allow(dead_code)]

use serde_json::{json, Value};

pub const PLAYLIST_ID: &str = "5ABHKGoOzxkaa28ttQV9sE";

fn artist(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "artist",
        "href": format!("https://api.spotify.com/v1/artists/{}", id),
        "external_urls": {"spotify": format!("https://open.spotify.com/artist/{}", id)}
    })
}

fn track(
    id: &str,
    name: &str,
    album: Value,
    artists: Vec<Value>,
    popularity: Option<i64>,
) -> Value {
    let mut track = json!({
        "id": id,
        "name": name,
        "duration_ms": 180000,
        "explicit": false,
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
        "album": album,
        "artists": artists,
        "is_local": false
    });
    if let Some(popularity) = popularity {
        track["popularity"] = json!(popularity);
    }
    track
}

/// Two tracks on one album (artists A+B and A+C), a third track on another
/// album with an unparseable release date and no popularity, and one removed track.
pub fn playlist_payload() -> Value {
    let shared_album = json!({
        "id": "album1",
        "name": "Shared Album",
        "release_date": "2021-06-04",
        "release_date_precision": "day",
        "total_tracks": 11,
        "external_urls": {"spotify": "https://open.spotify.com/album/album1"},
        "artists": [artist("A", "Artist A")]
    });
    let odd_album = json!({
        "id": "album2",
        "name": "Odd Album",
        "release_date": "someday",
        "total_tracks": 3,
        "external_urls": {"spotify": "https://open.spotify.com/album/album2"},
        "artists": [artist("D", "Artist D")]
    });

    json!({
        "href": format!("https://api.spotify.com/v1/playlists/{}/tracks?offset=0&limit=100", PLAYLIST_ID),
        "limit": 100,
        "next": null,
        "offset": 0,
        "total": 4,
        "items": [
            {
                "added_at": "2024-01-15T09:30:00Z",
                "track": track("song1", "First Song", shared_album.clone(),
                    vec![artist("A", "Artist A"), artist("B", "Artist B")], Some(80))
            },
            {
                "added_at": "2024-01-16T10:00:00Z",
                "track": track("song2", "Second Song", shared_album,
                    vec![artist("A", "Artist A"), artist("C", "Artist C")], Some(65))
            },
            {
                "added_at": "not a timestamp",
                "track": track("song3", "Third Song", odd_album,
                    vec![artist("D", "Artist D")], None)
            },
            {
                "added_at": "2024-01-17T11:00:00Z",
                "track": null
            }
        ]
    })
}
