use super::JimakuProvider;
use super::filter::FilterChain;
use crate::error::Result;
use crate::types::{CatalogEntry, SubtitleCandidate, SubtitleFile, VideoIdentity};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Listing path for an entry, scoped to `episode` when given
pub(crate) fn files_path(entry_id: u64, episode: Option<u32>) -> String {
    match episode {
        Some(episode) => format!("entries/{entry_id}/files?episode={episode}"),
        None => format!("entries/{entry_id}/files"),
    }
}

/// Alternate episode number worth a second listing request, if any
fn alternate_episode(video: &VideoIdentity) -> Option<u32> {
    match video {
        VideoIdentity::Episode(info) => info
            .absolute_episode
            .filter(|absolute| *absolute != info.episode),
        VideoIdentity::Movie(_) => None,
    }
}

impl JimakuProvider {
    /// List and filter the files of `entry` for `video`
    ///
    /// Episodes are listed per episode number. An empty listing is retried
    /// once with the absolute episode number when it differs.
    pub async fn list_files(
        &self,
        video: &Arc<VideoIdentity>,
        entry: &CatalogEntry,
    ) -> Result<Vec<SubtitleCandidate>> {
        let mut episode = video.episode();
        let mut data = self.fetch(&files_path(entry.id, episode)).await?;

        if data.is_none()
            && self.config.retry_with_alternate_episode
            && let Some(alternate) = alternate_episode(video)
        {
            warn!(
                entry_id = entry.id,
                ?episode,
                alternate,
                "no files found, retrying with alternate episode number"
            );
            episode = Some(alternate);
            data = self.fetch(&files_path(entry.id, episode)).await?;
        }

        let Some(data) = data else {
            info!(entry_id = entry.id, ?episode, "no files found for entry");
            return Ok(Vec::new());
        };

        let files: Vec<SubtitleFile> = serde_json::from_value(data)?;
        let listed = files.len();
        let files = FilterChain::for_listing(&self.config, &files).apply(files);
        debug!(entry_id = entry.id, listed, kept = files.len(), "filtered file listing");

        let id = SubtitleCandidate::synthesize_id(
            entry.cross_reference(),
            episode.unwrap_or(0),
            video.release_group(),
        );

        Ok(files
            .into_iter()
            .map(|file| SubtitleCandidate::new(Arc::clone(video), id.clone(), file.url, file.name))
            .collect())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EpisodeInfo, MovieInfo};

    #[test]
    fn listing_paths() {
        assert_eq!(files_path(42, Some(5)), "entries/42/files?episode=5");
        assert_eq!(files_path(42, None), "entries/42/files");
    }

    #[test]
    fn alternate_episode_requires_a_different_number() {
        let mut info = EpisodeInfo {
            series: "Show".into(),
            season: 2,
            episode: 2,
            ..Default::default()
        };
        assert_eq!(alternate_episode(&VideoIdentity::Episode(info.clone())), None);

        info.absolute_episode = Some(2);
        assert_eq!(alternate_episode(&VideoIdentity::Episode(info.clone())), None);

        info.absolute_episode = Some(14);
        assert_eq!(alternate_episode(&VideoIdentity::Episode(info)), Some(14));

        let movie = VideoIdentity::Movie(MovieInfo::default());
        assert_eq!(alternate_episode(&movie), None);
    }
}
