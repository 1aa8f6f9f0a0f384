//! Exclusion policies applied to a file listing
//!
//! Each [`Exclusion`] is judged on its own; a file survives when no exclusion
//! in the chain rejects it.

use crate::config::Config;
use crate::types::SubtitleFile;
use tracing::{debug, warn};

/// Filename marker of machine-transcribed subtitles
pub const AI_MARKER: &str = "whisperai";

/// Containers that are never downloaded
pub const UNSUPPORTED_ARCHIVES: &[&str] = &[".7z"];

/// Containers that are skipped when archive handling is disabled
pub const OPTIONAL_ARCHIVES: &[&str] = &[".zip", ".rar"];

/// One reason to drop a listed file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exclusion {
    /// Name carries the [`AI_MARKER`] (case-insensitive)
    AiGenerated,
    /// Reported size below `threshold` bytes; unknown sizes pass
    ProbablyCorrupt {
        /// Minimum accepted size in bytes
        threshold: u64,
    },
    /// Name ends with one of `extensions`
    ArchiveFormat {
        /// Dotted, lower-case extensions
        extensions: Vec<&'static str>,
    },
}

impl Exclusion {
    /// Whether `file` is rejected
    pub fn excludes(&self, file: &SubtitleFile) -> bool {
        match self {
            Exclusion::AiGenerated => file.name.to_lowercase().contains(AI_MARKER),
            Exclusion::ProbablyCorrupt { threshold } => {
                file.size.is_some_and(|size| size < *threshold)
            }
            Exclusion::ArchiveFormat { extensions } => file.has_extension(extensions),
        }
    }

    /// Short reason used in logs
    pub fn reason(&self) -> &'static str {
        match self {
            Exclusion::AiGenerated => "ai generated",
            Exclusion::ProbablyCorrupt { .. } => "probably corrupt",
            Exclusion::ArchiveFormat { .. } => "unwanted archive format",
        }
    }
}

/// Ordered set of exclusions for one listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterChain {
    exclusions: Vec<Exclusion>,
}

impl FilterChain {
    /// Chain from explicit exclusions
    pub fn new(exclusions: Vec<Exclusion>) -> Self {
        Self { exclusions }
    }

    /// Build the chain for one entry's listing
    ///
    /// With archives disabled, `.zip` and `.rar` are still let through when the
    /// listing holds nothing else, since excluding them would leave no
    /// candidates at all.
    pub fn for_listing(config: &Config, files: &[SubtitleFile]) -> Self {
        let mut exclusions = Vec::with_capacity(3);

        if !config.enable_ai_subs {
            exclusions.push(Exclusion::AiGenerated);
        }
        exclusions.push(Exclusion::ProbablyCorrupt {
            threshold: config.corrupted_file_size_threshold,
        });

        let mut extensions = UNSUPPORTED_ARCHIVES.to_vec();
        if !config.enable_archives {
            let archives_only =
                !files.is_empty() && files.iter().all(|file| file.has_extension(OPTIONAL_ARCHIVES));
            if archives_only {
                warn!(
                    files = files.len(),
                    "archives are disabled but this entry only has archives, downloading them anyway"
                );
            } else {
                extensions.extend_from_slice(OPTIONAL_ARCHIVES);
            }
        }
        exclusions.push(Exclusion::ArchiveFormat { extensions });

        Self { exclusions }
    }

    /// Exclusions in evaluation order
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Keep the files no exclusion rejects, preserving order
    pub fn apply(&self, files: Vec<SubtitleFile>) -> Vec<SubtitleFile> {
        files
            .into_iter()
            .filter(|file| match self.exclusions.iter().find(|e| e.excludes(file)) {
                Some(Exclusion::ArchiveFormat { .. }) => {
                    debug!(name = %file.name, reason = "unwanted archive format", "skipping file");
                    false
                }
                Some(exclusion) => {
                    warn!(
                        name = %file.name,
                        size = ?file.size,
                        reason = exclusion.reason(),
                        "skipping file"
                    );
                    false
                }
                None => true,
            })
            .collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: Option<u64>) -> SubtitleFile {
        SubtitleFile {
            name: name.into(),
            url: format!("https://jimaku.cc/entry/1/download/{name}"),
            size,
            last_modified: None,
        }
    }

    fn names(files: &[SubtitleFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    fn config(enable_archives: bool, enable_ai_subs: bool) -> Config {
        Config {
            enable_archives,
            enable_ai_subs,
            ..Config::new("key")
        }
    }

    #[test]
    fn corrupt_threshold_is_exclusive() {
        let files = vec![
            file("small.srt", Some(499)),
            file("edge.srt", Some(500)),
            file("unknown.srt", None),
        ];
        let chain = FilterChain::for_listing(&config(true, false), &files);
        assert_eq!(names(&chain.apply(files)), ["edge.srt", "unknown.srt"]);
    }

    #[test]
    fn ai_marker_is_case_insensitive() {
        let files = vec![
            file("Show - 01 [WhisperAI].srt", Some(4096)),
            file("Show - 01.ass", Some(4096)),
        ];

        let chain = FilterChain::for_listing(&config(true, false), &files);
        assert_eq!(names(&chain.apply(files.clone())), ["Show - 01.ass"]);

        let chain = FilterChain::for_listing(&config(true, true), &files);
        assert_eq!(chain.apply(files.clone()), files);
    }

    #[test]
    fn seven_zip_is_always_excluded() {
        let files = vec![file("pack.7z", Some(90_000)), file("pack.zip", Some(90_000))];
        let chain = FilterChain::for_listing(&config(true, true), &files);
        assert_eq!(names(&chain.apply(files)), ["pack.zip"]);
    }

    #[test]
    fn archives_excluded_when_disabled() {
        let files = vec![
            file("pack.zip", Some(90_000)),
            file("pack.RAR", Some(90_000)),
            file("Show - 01.srt", Some(2048)),
        ];
        let chain = FilterChain::for_listing(&config(false, false), &files);
        assert_eq!(names(&chain.apply(files)), ["Show - 01.srt"]);
    }

    #[test]
    fn archive_only_listing_relaxes_exclusion() {
        let files = vec![file("s1.zip", Some(90_000)), file("s2.zip", Some(80_000))];
        let chain = FilterChain::for_listing(&config(false, false), &files);
        assert_eq!(
            chain.exclusions().last(),
            Some(&Exclusion::ArchiveFormat {
                extensions: vec![".7z"]
            })
        );
        assert_eq!(chain.apply(files.clone()), files);
    }

    #[test]
    fn empty_listing_keeps_exclusion() {
        let chain = FilterChain::for_listing(&config(false, false), &[]);
        assert_eq!(
            chain.exclusions().last(),
            Some(&Exclusion::ArchiveFormat {
                extensions: vec![".7z", ".zip", ".rar"]
            })
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let files = vec![
            file("a [whisperai].srt", Some(4096)),
            file("b.srt", Some(10)),
            file("c.7z", None),
            file("d.ass", Some(4096)),
        ];
        let chain = FilterChain::for_listing(&config(true, false), &files);
        let once = chain.apply(files);
        let twice = chain.apply(once.clone());
        assert_eq!(once, twice);
        assert_eq!(names(&once), ["d.ass"]);
    }
}
