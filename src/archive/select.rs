use regex::Regex;
use std::sync::LazyLock;

/// Extensions treated as subtitle files inside archives
pub const SUBTITLE_EXTENSIONS: &[&str] = &[".srt", ".ass", ".ssa", ".sub", ".vtt", ".sup", ".idx"];

// Explicit episode markers: S01E05, E05 / EP05 / Episode 5, "Show - 05", 第5話
#[allow(clippy::expect_used)]
static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)s\d{1,2}e(\d{1,4})|\be(?:p|pisode)?[\s.]?(\d{1,4})\b|\s-\s(\d{1,4})\b|第(\d{1,4})",
    )
    .expect("valid episode marker regex")
});

// Release tags, CRCs and resolutions live in brackets
#[allow(clippy::expect_used)]
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]|\([^)]*\)|【[^】]*】").expect("valid bracket regex")
});

#[allow(clippy::expect_used)]
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,4}").expect("valid number regex"));

/// Chooses which archive member to use as the subtitle
pub trait MemberSelector: Send + Sync {
    /// Pick one of `names` for `episode` (`None` for movies)
    fn select<'a>(&self, names: &'a [String], episode: Option<u32>) -> Option<&'a str>;
}

/// Default member selection
///
/// Only subtitle files are considered. A lone subtitle is taken as is. With
/// several, the one carrying the requested episode number wins; when none does,
/// nothing is selected. Without an episode the first by name is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeMemberSelector;

impl MemberSelector for EpisodeMemberSelector {
    fn select<'a>(&self, names: &'a [String], episode: Option<u32>) -> Option<&'a str> {
        let mut subtitles: Vec<&'a str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| is_subtitle(name))
            .collect();
        subtitles.sort_unstable();

        if subtitles.len() <= 1 {
            return subtitles.first().copied();
        }

        match episode {
            Some(episode) => subtitles
                .into_iter()
                .find(|name| episode_numbers(name).contains(&episode)),
            None => subtitles.first().copied(),
        }
    }
}

fn is_subtitle(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUBTITLE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Episode numbers mentioned in a file name
///
/// Explicit markers are preferred; without any, the last bare number outside
/// brackets counts.
pub fn episode_numbers(name: &str) -> Vec<u32> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    let cleaned = BRACKETED.replace_all(stem, " ");

    let marked: Vec<u32> = EPISODE_MARKER
        .captures_iter(&cleaned)
        .filter_map(|caps| caps.iter().skip(1).flatten().next())
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if !marked.is_empty() {
        return marked;
    }

    NUMBER
        .find_iter(&cleaned)
        .last()
        .and_then(|m| m.as_str().parse().ok())
        .into_iter()
        .collect()
}
