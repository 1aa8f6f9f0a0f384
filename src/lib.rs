//! # jimaku-dl
//!
//! Subtitle discovery and retrieval client for the [Jimaku](https://jimaku.cc)
//! subtitle catalog.
//!
//! ## Design Philosophy
//!
//! jimaku-dl is designed to be:
//! - **Library-first** - No CLI or UI, a provider a host application embeds
//! - **Quiet on misses** - No entry, no files or everything filtered out all
//!   yield an empty list, never an error
//! - **Polite to the catalog** - Rate limits are honored with bounded backoff
//!   and identical reads are memoized
//!
//! ## Quick Start
//!
//! ```no_run
//! use jimaku_dl::{Config, EpisodeInfo, JimakuProvider, TagGuesser, VideoIdentity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         enable_archives: false,
//!         ..Config::new(std::env::var("JIMAKU_API_KEY")?)
//!     };
//!
//!     let mut provider = JimakuProvider::new(config)?;
//!     provider.initialize()?;
//!
//!     let video = VideoIdentity::Episode(EpisodeInfo {
//!         series: "Kaguya-sama: Love is War".into(),
//!         season: 2,
//!         episode: 5,
//!         release_group: Some("SubsPlease".into()),
//!         ..Default::default()
//!     });
//!
//!     let mut candidates = provider.list_subtitles(&video).await?;
//!     candidates.sort_by_key(|c| std::cmp::Reverse(c.matches(&video, &TagGuesser).len()));
//!
//!     if let Some(best) = candidates.first_mut() {
//!         provider.download_subtitle(best).await?;
//!         println!("{}: {:?} bytes", best.filename, best.content.as_ref().map(Vec::len));
//!     }
//!
//!     provider.terminate();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive sniffing and member extraction
pub mod archive;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Match scoring
pub mod matching;
/// Catalog provider and its pipeline
pub mod provider;
/// Rate-limit aware retry loop
pub mod ratelimit;
/// Core types
pub mod types;

pub use config::{Config, RateLimitConfig};
pub use error::{ArchiveError, Error, Result};
pub use matching::{Match, ReleaseGuess, ReleaseGuesser, TagGuesser};
pub use provider::{Exclusion, FilterChain, JimakuProvider, SubtitleProvider};
pub use types::{
    ArchiveType, CatalogEntry, EntryFlags, EpisodeInfo, Language, MovieInfo, SubtitleCandidate,
    SubtitleFile, VideoIdentity, VideoKind,
};
