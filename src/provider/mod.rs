//! Jimaku subtitle provider
//!
//! The pipeline runs in four steps, each in its own submodule:
//! 1. [`resolve`](JimakuProvider::resolve) finds the catalog entry for a video
//! 2. [`list_files`](JimakuProvider::list_files) lists and filters its files
//! 3. [`retrieve`](JimakuProvider::retrieve) downloads one candidate and unpacks archives
//! 4. every API call goes through the rate-limited, memoized fetcher
//!
//! Memoized responses live as long as the provider. The catalog is only read,
//! so stale entries are accepted for the lifetime of one run.

mod download;
mod fetch;
pub mod filter;
mod listing;
mod resolve;
mod traits;

pub use filter::{Exclusion, FilterChain};
pub use traits::SubtitleProvider;

use crate::archive::{EpisodeMemberSelector, MemberSelector};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{SubtitleCandidate, VideoIdentity};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Client for the Jimaku subtitle catalog
///
/// # Example
///
/// ```no_run
/// use jimaku_dl::{Config, EpisodeInfo, JimakuProvider, VideoIdentity};
///
/// # async fn example() -> jimaku_dl::Result<()> {
/// let mut provider = JimakuProvider::new(Config::new("api-key"))?;
/// provider.initialize()?;
///
/// let video = VideoIdentity::Episode(EpisodeInfo {
///     series: "Sousou no Frieren".into(),
///     season: 1,
///     episode: 5,
///     anilist_id: Some(154587),
///     ..Default::default()
/// });
///
/// let mut candidates = provider.list_subtitles(&video).await?;
/// if let Some(candidate) = candidates.first_mut() {
///     provider.download_subtitle(candidate).await?;
/// }
///
/// provider.terminate();
/// # Ok(())
/// # }
/// ```
pub struct JimakuProvider {
    config: Config,
    api_key: String,
    session: Option<reqwest::Client>,
    selector: Arc<dyn MemberSelector>,
    /// Parsed bodies keyed by request path; `None` records "no result"
    responses: Mutex<HashMap<String, Option<Value>>>,
    /// Search paths keyed by video and derived media name
    search_paths: Mutex<HashMap<(VideoIdentity, String), String>>,
}

impl std::fmt::Debug for JimakuProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JimakuProvider")
            .field("api_url", &self.config.api_url)
            .field("enable_archives", &self.config.enable_archives)
            .field("enable_ai_subs", &self.config.enable_ai_subs)
            .field("initialized", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl JimakuProvider {
    /// Create a provider; the session is opened by [`initialize`](Self::initialize)
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the API key is missing or the
    /// configuration is otherwise invalid.
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config.validate()?.to_string();

        Ok(Self {
            config,
            api_key,
            session: None,
            selector: Arc::new(EpisodeMemberSelector),
            responses: Mutex::new(HashMap::new()),
            search_paths: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the archive member selection policy
    pub fn with_member_selector(mut self, selector: Arc<dyn MemberSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Provider configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the HTTP session
    ///
    /// Every request carries the configured user agent, a JSON content type and
    /// the raw API key as `Authorization`.
    pub fn initialize(&mut self) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|e| Error::config(format!("invalid user agent: {e}"), "user_agent"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut authorization = HeaderValue::from_str(&self.api_key)
            .map_err(|e| Error::config(format!("invalid api key: {e}"), "api_key"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.config.request_timeout)
            .build()?;

        self.session = Some(client);
        info!(api_url = %self.config.api_url, "jimaku session initialized");
        Ok(())
    }

    /// Close the HTTP session; later requests fail with [`Error::SessionClosed`]
    pub fn terminate(&mut self) {
        if self.session.take().is_some() {
            debug!("jimaku session closed");
        }
    }

    /// Whether [`initialize`](Self::initialize) has been called without a matching terminate
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&reqwest::Client> {
        self.session.as_ref().ok_or(Error::SessionClosed)
    }

    /// List subtitles for `video`
    ///
    /// Returns an empty list when no entry or no usable file is found.
    /// Authentication, throttling and transport failures are returned as errors.
    pub async fn list_subtitles(&self, video: &VideoIdentity) -> Result<Vec<SubtitleCandidate>> {
        let Some(entry) = self.resolve(video).await? else {
            return Ok(Vec::new());
        };

        self.list_files(&Arc::new(video.clone()), &entry).await
    }

    /// Download `candidate` and attach its content
    ///
    /// When the URL names an archive but the payload is not one, the content
    /// stays unset and no error is returned.
    pub async fn download_subtitle(&self, candidate: &mut SubtitleCandidate) -> Result<()> {
        if let Some(content) = self.retrieve(candidate).await? {
            candidate.content = Some(content);
        }
        Ok(())
    }
}
