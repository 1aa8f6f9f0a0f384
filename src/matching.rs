//! Match scoring between a candidate and a queried video
//!
//! The host ranks candidates by the set of attributes they match. Release
//! group detection relies on a filename guesser supplied by the host; a simple
//! tag-based one is provided as default.

use crate::types::{SubtitleCandidate, VideoIdentity, VideoKind};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// An attribute of the video a candidate matches
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Match {
    /// Series name (episodes)
    Series,
    /// Season number (episodes)
    Season,
    /// Movie title
    Title,
    /// Release year
    Year,
    /// The video is a movie
    Movie,
    /// The video is an episode
    Episode,
    /// Release group (or source) from the filename equals the video's
    ReleaseGroup,
}

/// Tokens guessed from a subtitle filename
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReleaseGuess {
    /// Release group, e.g. "SubsPlease"
    pub release_group: Option<String>,
    /// Source, e.g. "WEB" or "BD"
    pub source: Option<String>,
}

/// Infers release tokens from a filename
pub trait ReleaseGuesser: Send + Sync {
    /// Guess tokens for `filename` of a video of `kind`
    fn guess(&self, filename: &str, kind: VideoKind) -> ReleaseGuess;
}

#[allow(clippy::expect_used)]
static LEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\]]+)\]").expect("valid tag regex"));

#[allow(clippy::expect_used)]
static SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(web-?dl|webrip|web|blu-?ray|bdrip|bd|dvd|tv)(?:[^a-z0-9]|$)")
        .expect("valid source regex")
});

/// Default guesser for fansub-style names like `[Group] Show - 01 (WEB 1080p).ass`
#[derive(Debug, Clone, Copy, Default)]
pub struct TagGuesser;

impl ReleaseGuesser for TagGuesser {
    fn guess(&self, filename: &str, _kind: VideoKind) -> ReleaseGuess {
        let release_group = LEADING_TAG
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|group| !group.is_empty());

        let source = SOURCE
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        ReleaseGuess {
            release_group,
            source,
        }
    }
}

/// Normalize a title for comparison: lower-case, punctuation to spaces
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn name_matches(candidate: &str, queried: &str, alternatives: &[String]) -> bool {
    let wanted = sanitize(candidate);
    !sanitize(queried).is_empty()
        && std::iter::once(queried)
            .chain(alternatives.iter().map(String::as_str))
            .any(|name| sanitize(name) == wanted)
}

impl SubtitleCandidate {
    /// Attributes of `video` this candidate matches
    ///
    /// `video` is the video being scored; the candidate compares it against the
    /// video it was listed for.
    pub fn matches(&self, video: &VideoIdentity, guesser: &dyn ReleaseGuesser) -> BTreeSet<Match> {
        let mut matches = BTreeSet::new();

        match (video, self.video.as_ref()) {
            (VideoIdentity::Episode(queried), VideoIdentity::Episode(listed)) => {
                if name_matches(&listed.series, &queried.series, &queried.alternative_series) {
                    matches.insert(Match::Series);
                }
                if queried.season == listed.season {
                    matches.insert(Match::Season);
                }
            }
            (VideoIdentity::Movie(queried), VideoIdentity::Movie(listed)) => {
                if name_matches(&listed.title, &queried.title, &queried.alternative_titles) {
                    matches.insert(Match::Title);
                }
            }
            _ => {}
        }

        if let (Some(a), Some(b)) = (video.year(), self.video.year())
            && a == b
        {
            matches.insert(Match::Year);
        }

        matches.insert(match video.kind() {
            VideoKind::Movie => Match::Movie,
            VideoKind::Episode => Match::Episode,
        });

        if let Some(group) = video.release_group() {
            let guess = guesser.guess(&self.filename, video.kind());
            tracing::debug!(filename = %self.filename, ?guess, "guessed release tokens");
            let hit = [guess.release_group.as_deref(), guess.source.as_deref()]
                .into_iter()
                .flatten()
                .any(|token| token.eq_ignore_ascii_case(group));
            if hit {
                matches.insert(Match::ReleaseGroup);
            }
        }

        matches
    }
}
