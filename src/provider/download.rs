use super::JimakuProvider;
use crate::archive::{self, MemberSelector};
use crate::error::{ArchiveError, Error, Result};
use crate::types::{ArchiveType, SubtitleCandidate};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of unpacking a downloaded body
#[derive(Debug)]
enum Payload {
    /// Subtitle taken from an archive
    Member { name: String, content: Vec<u8> },
    /// Archive without a subtitle for the episode
    NoMember { kind: ArchiveType, count: usize },
    /// Body that is not an archive
    Raw(Vec<u8>),
}

/// Sniff `body` and extract the subtitle for `episode` when it is an archive
fn unpack(body: Vec<u8>, episode: Option<u32>, selector: &dyn MemberSelector) -> Result<Payload> {
    let Some(mut archive) = archive::sniff(&body)? else {
        return Ok(Payload::Raw(body));
    };
    match archive.extract_subtitle(episode, selector) {
        Ok((name, content)) => Ok(Payload::Member { name, content }),
        Err(ArchiveError::NoSubtitleMember { count }) => Ok(Payload::NoMember {
            kind: archive.kind(),
            count,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Archive type suggested by the file name at the end of `url`
fn archive_hint(url: &str) -> Option<ArchiveType> {
    let hint = match url::Url::parse(url) {
        Ok(parsed) => ArchiveType::from_filename(parsed.path()),
        Err(_) => ArchiveType::from_filename(url),
    };
    hint.filter(|kind| matches!(kind, ArchiveType::Zip | ArchiveType::Rar))
}

impl JimakuProvider {
    /// Download `candidate` and return the subtitle bytes
    ///
    /// Returns `None` when the URL names an archive but the payload is not one,
    /// or when the archive holds no subtitle for the candidate's episode.
    pub async fn retrieve(&self, candidate: &SubtitleCandidate) -> Result<Option<Vec<u8>>> {
        let session = self.session()?;
        let url = candidate.download_url.as_str();

        info!(url, filename = %candidate.filename, "downloading subtitle");
        let response = session.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?.to_vec();
        debug!(url, size = body.len(), "downloaded subtitle payload");

        let episode = candidate.video.episode();
        let selector = Arc::clone(&self.selector);
        let payload = tokio::task::spawn_blocking(move || unpack(body, episode, selector.as_ref()))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("unpack task failed: {e}"))))??;

        match payload {
            Payload::Member { name, content } => {
                info!(url, member = %name, size = content.len(), "extracted subtitle from archive");
                Ok(Some(content))
            }
            Payload::NoMember { kind, count } => {
                warn!(
                    url,
                    ?episode,
                    kind = kind.extension(),
                    entries = count,
                    "archive holds no subtitle for this episode"
                );
                Ok(None)
            }
            Payload::Raw(body) => {
                if let Some(kind) = archive_hint(url) {
                    warn!(
                        url,
                        expected = kind.extension(),
                        "payload is not an archive although the url names one, possibly corrupt"
                    );
                    return Ok(None);
                }
                Ok(Some(body))
            }
        }
    }
}
