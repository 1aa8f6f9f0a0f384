use super::JimakuProvider;
use crate::error::Result;
use crate::types::{CatalogEntry, VideoIdentity};
use tracing::{info, warn};

/// Search path for a video: by AniList id when known, else fuzzy by name
pub(crate) fn search_path(video: &VideoIdentity, media_name: &str) -> String {
    match video.anilist_id() {
        Some(anilist_id) => {
            info!(anilist_id, "searching entry by anilist id");
            format!("entries/search?anilist_id={anilist_id}")
        }
        None => {
            info!(media_name, "searching entry by name");
            format!("entries/search?query={}", urlencoding::encode(media_name))
        }
    }
}

impl JimakuProvider {
    /// Memoized [`search_path`]
    async fn memoized_search_path(&self, video: &VideoIdentity, media_name: String) -> String {
        let mut paths = self.search_paths.lock().await;
        paths
            .entry((video.clone(), media_name))
            .or_insert_with_key(|(video, media_name)| search_path(video, media_name))
            .clone()
    }

    /// Find the catalog entry for `video`
    ///
    /// Only the first search result is used. Returns `None` when the search
    /// yields nothing.
    pub async fn resolve(&self, video: &VideoIdentity) -> Result<Option<CatalogEntry>> {
        let path = self.memoized_search_path(video, video.media_name()).await;

        let Some(data) = self.fetch(&path).await? else {
            return Ok(None);
        };
        let Some(first) = data.as_array().and_then(|entries| entries.first()) else {
            warn!(%path, "search response is not a list of entries");
            return Ok(None);
        };

        let entry: CatalogEntry = serde_json::from_value(first.clone())?;
        info!(
            entry_id = entry.id,
            anilist_id = ?entry.anilist_id,
            name = %entry.name,
            english_name = ?entry.english_name,
            "matched catalog entry"
        );
        if entry.flags.unverified {
            warn!(
                entry_id = entry.id,
                "entry is unverified, subtitles might be incomplete or have quality issues"
            );
        }

        Ok(Some(entry))
    }
}
