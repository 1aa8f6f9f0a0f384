//! Catalog payloads and subtitle content generators

use jimaku_dl::{EpisodeInfo, MovieInfo, VideoIdentity};
use serde_json::{Value, json};
use std::io::Write;

/// Minimal SRT subtitle
pub const SAMPLE_SRT: &[u8] =
    "1\n00:00:01,000 --> 00:00:03,000\nこんにちは\n\n2\n00:00:04,000 --> 00:00:06,000\nさようなら\n"
        .as_bytes();

/// Minimal ASS subtitle
pub const SAMPLE_ASS: &[u8] = b"[Script Info]\nScriptType: v4.00+\n\n[Events]\nDialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,test\n";

/// Kaguya-sama S2E5, cross-referenced to AniList 1234
///
/// The second cour is numbered 13-24 on the catalog, so the absolute number
/// is 17.
pub fn kaguya_episode() -> VideoIdentity {
    VideoIdentity::Episode(EpisodeInfo {
        series: "Kaguya-sama: Love is War".into(),
        season: 2,
        episode: 5,
        absolute_episode: Some(17),
        release_group: Some("SubsPlease".into()),
        anilist_id: Some(1234),
        ..Default::default()
    })
}

/// Same episode without an AniList id, resolved by name
pub fn kaguya_episode_by_name() -> VideoIdentity {
    VideoIdentity::Episode(EpisodeInfo {
        series: "Kaguya-sama: Love is War".into(),
        season: 2,
        episode: 5,
        ..Default::default()
    })
}

/// A movie resolved by name
pub fn movie() -> VideoIdentity {
    VideoIdentity::Movie(MovieInfo {
        title: "Tenki no Ko".into(),
        year: Some(2019),
        ..Default::default()
    })
}

/// Search result holding a single entry
pub fn search_result(id: u64, anilist_id: Option<u64>, name: &str) -> Value {
    json!([{
        "id": id,
        "anilist_id": anilist_id,
        "name": name,
        "english_name": null,
        "flags": {"unverified": false, "anime": true},
        "last_modified": "2024-03-01T12:00:00Z"
    }])
}

/// One file in a listing served by `base`
pub fn file_entry(base: &str, name: &str, size: u64) -> Value {
    json!({
        "name": name,
        "url": format!("{base}/download/{name}"),
        "size": size,
        "last_modified": "2024-03-01T12:00:00Z"
    })
}

/// ZIP archive holding `files`, stored uncompressed
#[allow(clippy::unwrap_used)]
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
