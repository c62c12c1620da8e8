mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use spotify_etl::core::archive::sweep_staging;
use spotify_etl::core::tabular::from_csv;
use spotify_etl::core::{AlbumRecord, ArchiveScope, ArtistRecord, SongRecord, Storage};
use spotify_etl::{EtlError, LocalStorage, Transformer};
use tempfile::TempDir;

const STAGED: &str = "rawdata/to_processed/spotify_raw_20240120_120000.json";

async fn staged_storage(temp_dir: &TempDir, keys: &[&str]) -> LocalStorage {
    let storage = LocalStorage::new(temp_dir.path());
    let data = serde_json::to_vec(&common::playlist_payload()).unwrap();
    for key in keys {
        storage.write_file(key, &data).await.unwrap();
    }
    storage
}

#[tokio::test]
async fn test_transform_writes_three_deduplicated_tables() {
    let temp_dir = TempDir::new().unwrap();
    let storage = staged_storage(&temp_dir, &[STAGED]).await;
    let transformer = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject);

    let now = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 5).unwrap();
    let summary = transformer.run_at(STAGED, now).await.unwrap();

    assert_eq!(summary.outputs.album, "transformeddata/album_data/album_20240120_120005.csv");
    assert_eq!(summary.outputs.artist, "transformeddata/artist_data/artist_20240120_120005.csv");
    assert_eq!(summary.outputs.songs, "transformeddata/songs_data/songs_20240120_120005.csv");

    let albums: Vec<AlbumRecord> =
        from_csv(&storage.read_file(&summary.outputs.album).await.unwrap()).unwrap();
    assert_eq!(albums.len(), 2);
    assert_eq!(albums[0].album_id, "album1");
    assert_eq!(albums[0].release_date, NaiveDate::from_ymd_opt(2021, 6, 4));
    assert_eq!(albums[0].total_tracks, Some(11));
    // 無法解析的日期變成空值，其他欄位照常輸出
    assert_eq!(albums[1].album_id, "album2");
    assert_eq!(albums[1].release_date, None);

    let artists: Vec<ArtistRecord> =
        from_csv(&storage.read_file(&summary.outputs.artist).await.unwrap()).unwrap();
    let artist_ids: Vec<&str> = artists.iter().map(|a| a.artist_id.as_str()).collect();
    assert_eq!(artist_ids, vec!["A", "B", "C", "D"]);

    let songs: Vec<SongRecord> =
        from_csv(&storage.read_file(&summary.outputs.songs).await.unwrap()).unwrap();
    assert_eq!(songs.len(), 3);
    assert_eq!(songs[0].song_id, "song1");
    assert_eq!(songs[0].popularity, Some(80));
    assert_eq!(
        songs[0].song_added,
        Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
    );
    assert_eq!(songs[1].artist_id.as_deref(), Some("A"));
    assert_eq!(songs[2].popularity, None);
    assert_eq!(songs[2].song_added, None);
    assert_eq!(songs[2].album_id.as_deref(), Some("album2"));

    assert_eq!((summary.albums, summary.artists, summary.songs), (2, 4, 3));
}

#[tokio::test]
async fn test_csv_headers_are_fixed() {
    let temp_dir = TempDir::new().unwrap();
    let storage = staged_storage(&temp_dir, &[STAGED]).await;
    let summary = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject)
        .run(STAGED)
        .await
        .unwrap();

    let first_line = |data: Vec<u8>| {
        String::from_utf8(data)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    };
    assert_eq!(
        first_line(storage.read_file(&summary.outputs.album).await.unwrap()),
        "album_id,name,release_date,total_tracks,url"
    );
    assert_eq!(
        first_line(storage.read_file(&summary.outputs.artist).await.unwrap()),
        "artist_id,artist_name,external_url"
    );
    assert_eq!(
        first_line(storage.read_file(&summary.outputs.songs).await.unwrap()),
        "song_id,song_name,duration_ms,url,popularity,song_added,album_id,artist_id"
    );
}

#[tokio::test]
async fn test_transform_archives_only_triggering_object_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let other = "rawdata/to_processed/spotify_raw_20240120_130000.json";
    let storage = staged_storage(&temp_dir, &[STAGED, other]).await;

    let summary = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject)
        .run(STAGED)
        .await
        .unwrap();

    assert_eq!(summary.archive.archived, vec![STAGED.to_string()]);
    assert_eq!(
        storage.list_files("rawdata/to_processed/").await.unwrap(),
        vec![other.to_string()]
    );
    assert_eq!(
        storage.list_files("rawdata/processed/").await.unwrap(),
        vec!["rawdata/processed/spotify_raw_20240120_120000.json".to_string()]
    );
}

#[tokio::test]
async fn test_sweep_scope_drains_staging_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let other = "rawdata/to_processed/spotify_raw_20240120_130000.json";
    let storage = staged_storage(&temp_dir, &[STAGED, other]).await;

    let summary = Transformer::new(storage.clone(), ArchiveScope::Sweep)
        .run(STAGED)
        .await
        .unwrap();

    assert_eq!(summary.archive.archived.len(), 2);
    assert!(storage
        .list_files("rawdata/to_processed/")
        .await
        .unwrap()
        .is_empty());
    assert_eq!(storage.list_files("rawdata/processed/").await.unwrap().len(), 2);

    // 再掃一次空的前綴不會有任何動作
    let report = sweep_staging(&storage).await.unwrap();
    assert!(report.archived.is_empty() && report.failed.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_writes_nothing_and_stays_staged() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path());
    storage
        .write_file(STAGED, b"{\"items\": [ this is not json")
        .await
        .unwrap();

    let err = Transformer::new(storage.clone(), ArchiveScope::Sweep)
        .run(STAGED)
        .await
        .unwrap_err();

    match err {
        EtlError::ParseError { object, .. } => assert_eq!(object, STAGED),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(storage.list_files("transformeddata/").await.unwrap().is_empty());
    assert_eq!(
        storage.list_files("rawdata/").await.unwrap(),
        vec![STAGED.to_string()]
    );
}

#[tokio::test]
async fn test_second_transform_of_archived_object_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let storage = staged_storage(&temp_dir, &[STAGED]).await;
    let transformer = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject);

    transformer.run(STAGED).await.unwrap();
    let err = transformer.run(STAGED).await.unwrap_err();

    assert!(matches!(err, EtlError::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_empty_playlist_still_writes_headers() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path());
    storage.write_file(STAGED, b"{\"items\": []}").await.unwrap();

    let summary = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject)
        .run(STAGED)
        .await
        .unwrap();

    assert_eq!((summary.albums, summary.artists, summary.songs), (0, 0, 0));
    let songs = storage.read_file(&summary.outputs.songs).await.unwrap();
    assert_eq!(
        String::from_utf8(songs).unwrap(),
        "song_id,song_name,duration_ms,url,popularity,song_added,album_id,artist_id\n"
    );
}

#[tokio::test]
async fn test_back_to_back_transforms_keep_both_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let second = "rawdata/to_processed/spotify_raw_20240120_120001.json";
    let storage = staged_storage(&temp_dir, &[STAGED]).await;
    storage
        .write_file(
            second,
            br#"{"items": [{"added_at": null, "track": {"id": "solo", "name": "Solo", "duration_ms": 1000,
                "album": {"id": "album9", "name": "Nine", "artists": []}, "artists": []}}]}"#,
        )
        .await
        .unwrap();
    let transformer = Transformer::new(storage.clone(), ArchiveScope::TriggeringObject);
    let now = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 5).unwrap();

    let first = transformer.run_at(STAGED, now).await.unwrap();
    let next = transformer.run_at(second, now).await.unwrap();

    assert_ne!(first.outputs.songs, next.outputs.songs);
    assert_eq!(next.outputs.songs, "transformeddata/songs_data/songs_20240120_120005_1.csv");
    assert_eq!(
        storage.list_files("transformeddata/songs_data/").await.unwrap().len(),
        2
    );

    let first_songs: Vec<SongRecord> =
        from_csv(&storage.read_file(&first.outputs.songs).await.unwrap()).unwrap();
    let next_songs: Vec<SongRecord> =
        from_csv(&storage.read_file(&next.outputs.songs).await.unwrap()).unwrap();
    assert_eq!(first_songs.len(), 3);
    assert_eq!(next_songs.len(), 1);
    assert_eq!(next_songs[0].song_id, "solo");
}
