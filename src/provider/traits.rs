//! Host-facing provider interface

use super::JimakuProvider;
use crate::error::Result;
use crate::types::{Language, SubtitleCandidate, VideoIdentity};
use async_trait::async_trait;

/// A source of subtitles a host application can query
///
/// The host opens the provider with [`initialize`](Self::initialize), queries
/// it any number of times and closes it with [`terminate`](Self::terminate).
///
/// # Examples
///
/// ```no_run
/// use jimaku_dl::{Config, JimakuProvider, MovieInfo, SubtitleProvider, VideoIdentity};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut provider: Box<dyn SubtitleProvider> =
///     Box::new(JimakuProvider::new(Config::new("api-key"))?);
/// provider.initialize()?;
///
/// let video = VideoIdentity::Movie(MovieInfo {
///     title: "Kimi no Na wa".into(),
///     year: Some(2016),
///     ..Default::default()
/// });
/// for candidate in provider.list_subtitles(&video).await? {
///     println!("{} ({})", candidate.filename, candidate.id);
/// }
///
/// provider.terminate();
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Short provider name
    fn name(&self) -> &'static str;

    /// Languages this provider can return
    fn languages(&self) -> &'static [Language] {
        &[Language::Japanese]
    }

    /// Acquire the transport session
    fn initialize(&mut self) -> Result<()>;

    /// Release the transport session
    fn terminate(&mut self);

    /// Candidates for `video`; empty when nothing is found
    async fn list_subtitles(&self, video: &VideoIdentity) -> Result<Vec<SubtitleCandidate>>;

    /// Attach content to `candidate`; content stays unset on a corrupt archive
    async fn download_subtitle(&self, candidate: &mut SubtitleCandidate) -> Result<()>;
}

#[async_trait]
impl SubtitleProvider for JimakuProvider {
    fn name(&self) -> &'static str {
        SubtitleCandidate::PROVIDER_NAME
    }

    fn initialize(&mut self) -> Result<()> {
        JimakuProvider::initialize(self)
    }

    fn terminate(&mut self) {
        JimakuProvider::terminate(self)
    }

    async fn list_subtitles(&self, video: &VideoIdentity) -> Result<Vec<SubtitleCandidate>> {
        JimakuProvider::list_subtitles(self, video).await
    }

    async fn download_subtitle(&self, candidate: &mut SubtitleCandidate) -> Result<()> {
        JimakuProvider::download_subtitle(self, candidate).await
    }
}
