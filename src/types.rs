//! Core types: video identities, catalog records and subtitle candidates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Subtitle language served by the catalog
///
/// The catalog only carries Japanese subtitles, so every candidate reports the
/// same language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Japanese ("ja")
    Japanese,
}

impl Language {
    /// IETF language tag
    pub fn ietf(self) -> &'static str {
        match self {
            Language::Japanese => "ja",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ietf())
    }
}

/// Kind of video being searched for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    /// Feature film
    Movie,
    /// Episode of a series
    Episode,
}

impl std::fmt::Display for VideoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoKind::Movie => write!(f, "movie"),
            VideoKind::Episode => write!(f, "episode"),
        }
    }
}

/// Attributes of a movie
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieInfo {
    /// Movie title
    pub title: String,
    /// Known alternative titles
    #[serde(default)]
    pub alternative_titles: Vec<String>,
    /// Release year
    #[serde(default)]
    pub year: Option<u32>,
    /// Release group of the local file
    #[serde(default)]
    pub release_group: Option<String>,
    /// AniList identifier, when known
    #[serde(default)]
    pub anilist_id: Option<u64>,
}

/// Attributes of a series episode
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeInfo {
    /// Series name
    pub series: String,
    /// Known alternative series names
    #[serde(default)]
    pub alternative_series: Vec<String>,
    /// Season number
    pub season: u32,
    /// Episode number within the season
    pub episode: u32,
    /// Episode number counted across cours (e.g. 14 for S2E2 of a 12+12 show)
    #[serde(default)]
    pub absolute_episode: Option<u32>,
    /// Release year
    #[serde(default)]
    pub year: Option<u32>,
    /// Release group of the local file
    #[serde(default)]
    pub release_group: Option<String>,
    /// AniList identifier, when known
    #[serde(default)]
    pub anilist_id: Option<u64>,
}

/// The video we are looking subtitles up for
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VideoIdentity {
    /// A movie
    Movie(MovieInfo),
    /// A series episode
    Episode(EpisodeInfo),
}

impl VideoIdentity {
    /// Movie or episode
    pub fn kind(&self) -> VideoKind {
        match self {
            VideoIdentity::Movie(_) => VideoKind::Movie,
            VideoIdentity::Episode(_) => VideoKind::Episode,
        }
    }

    /// AniList identifier, when known
    pub fn anilist_id(&self) -> Option<u64> {
        match self {
            VideoIdentity::Movie(m) => m.anilist_id,
            VideoIdentity::Episode(e) => e.anilist_id,
        }
    }

    /// Release group of the local file
    pub fn release_group(&self) -> Option<&str> {
        match self {
            VideoIdentity::Movie(m) => m.release_group.as_deref(),
            VideoIdentity::Episode(e) => e.release_group.as_deref(),
        }
    }

    /// Release year
    pub fn year(&self) -> Option<u32> {
        match self {
            VideoIdentity::Movie(m) => m.year,
            VideoIdentity::Episode(e) => e.year,
        }
    }

    /// Episode number, `None` for movies
    pub fn episode(&self) -> Option<u32> {
        match self {
            VideoIdentity::Movie(_) => None,
            VideoIdentity::Episode(e) => Some(e.episode),
        }
    }

    /// Name used for fuzzy catalog search
    ///
    /// The catalog suffixes entries past the first season with the season
    /// number ("kaguya-sama 2"), so we do the same.
    pub fn media_name(&self) -> String {
        match self {
            VideoIdentity::Movie(m) => m.title.to_lowercase(),
            VideoIdentity::Episode(e) if e.season > 1 => {
                format!("{} {}", e.series.to_lowercase(), e.season)
            }
            VideoIdentity::Episode(e) => e.series.to_lowercase(),
        }
    }
}

/// Flags attached to a catalog entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFlags {
    /// Not quality-checked by the catalog maintainers
    #[serde(default)]
    pub unverified: bool,
}

/// A catalog entry grouping all subtitle files of one title
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog identifier
    pub id: u64,
    /// AniList cross-reference
    #[serde(default)]
    pub anilist_id: Option<u64>,
    /// Display name (usually romaji)
    pub name: String,
    /// English name
    #[serde(default)]
    pub english_name: Option<String>,
    /// Entry flags
    #[serde(default)]
    pub flags: EntryFlags,
    /// Last time files were added or changed
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Identifier used in candidate ids: the AniList id, else the catalog id
    pub fn cross_reference(&self) -> u64 {
        self.anilist_id.unwrap_or(self.id)
    }
}

/// A file in a catalog entry's file listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFile {
    /// File name
    pub name: String,
    /// Download URL
    pub url: String,
    /// Size in bytes, if reported
    #[serde(default)]
    pub size: Option<u64>,
    /// Upload or modification time
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl SubtitleFile {
    /// Lower-cased dotted extension of the file name, e.g. ".ass"
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then(|| format!(".{}", ext.to_lowercase()))
    }

    /// Whether the file name ends with any of the given extensions (".zip", ...)
    pub fn has_extension(&self, extensions: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        extensions.iter().any(|ext| name.ends_with(ext))
    }
}

/// Archive container formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// RAR archive (.rar)
    Rar,
    /// 7-Zip archive (.7z), never extracted
    SevenZip,
    /// ZIP archive (.zip)
    Zip,
}

impl ArchiveType {
    /// Guess the archive type from a file name or URL path
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "rar" => Some(ArchiveType::Rar),
            "7z" => Some(ArchiveType::SevenZip),
            "zip" => Some(ArchiveType::Zip),
            _ => None,
        }
    }

    /// Dotted extension
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveType::Rar => ".rar",
            ArchiveType::SevenZip => ".7z",
            ArchiveType::Zip => ".zip",
        }
    }
}

/// A subtitle offered for a video
///
/// Created while filtering a file listing; `content` stays empty until
/// [`JimakuProvider::download_subtitle`](crate::JimakuProvider::download_subtitle)
/// fills it in.
#[derive(Clone, Debug)]
pub struct SubtitleCandidate {
    /// The video this candidate was listed for
    pub video: Arc<VideoIdentity>,
    /// Stable id used by the host for deduplication
    pub id: String,
    /// Where the file is downloaded from
    pub download_url: String,
    /// File name as listed by the catalog
    pub filename: String,
    /// Release description shown to users
    pub release_info: String,
    /// Subtitle bytes, set once by download
    pub content: Option<Vec<u8>>,
}

impl SubtitleCandidate {
    /// Name of the provider producing these candidates
    pub const PROVIDER_NAME: &'static str = "jimaku";

    /// Create a candidate without content
    pub fn new(
        video: Arc<VideoIdentity>,
        id: String,
        download_url: String,
        filename: String,
    ) -> Self {
        Self {
            video,
            id,
            download_url,
            release_info: filename.clone(),
            filename,
            content: None,
        }
    }

    /// Build the deduplication id: `{cross reference}_{episode or 0}_{release group}`
    pub fn synthesize_id(cross_reference: u64, episode: u32, release_group: Option<&str>) -> String {
        format!(
            "{}_{}_{}",
            cross_reference,
            episode,
            release_group.unwrap_or("none")
        )
    }

    /// Subtitle language, always Japanese
    pub fn language(&self) -> Language {
        Language::Japanese
    }

    /// Whether content has been attached
    pub fn is_downloaded(&self) -> bool {
        self.content.is_some()
    }
}
