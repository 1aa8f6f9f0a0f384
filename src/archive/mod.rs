//! Archive sniffing and subtitle extraction
//!
//! Downloads are classified by their bytes, never by their file name. RAR is
//! tried before ZIP; 7z is not supported and never recognized.

mod rar;
mod select;
mod zip;

pub use rar::RarBuffer;
pub use select::{EpisodeMemberSelector, MemberSelector, SUBTITLE_EXTENSIONS, episode_numbers};
pub use zip::ZipBuffer;

use crate::error::{ArchiveError, Result};
use crate::types::ArchiveType;
use tracing::debug;

/// RAR 1.5 - 4.x signature
const RAR4_SIGNATURE: &[u8] = b"Rar!\x1a\x07\x00";
/// RAR 5.0 signature
const RAR5_SIGNATURE: &[u8] = b"Rar!\x1a\x07\x01\x00";

/// An opened archive held in memory (or a scratch file for RAR)
#[derive(Debug)]
pub enum Archive {
    /// RAR container
    Rar(RarBuffer),
    /// ZIP container
    Zip(ZipBuffer),
}

/// Detect the container format of `bytes` without opening it
pub fn detect(bytes: &[u8]) -> Option<ArchiveType> {
    if is_rar(bytes) {
        Some(ArchiveType::Rar)
    } else if ZipBuffer::is_zip(bytes) {
        Some(ArchiveType::Zip)
    } else {
        None
    }
}

/// Open `bytes` as an archive if they carry a supported container
///
/// Returns `Ok(None)` when no supported signature matches.
///
/// # Errors
/// Fails only when a RAR buffer cannot be spilled to its scratch file.
pub fn sniff(bytes: &[u8]) -> Result<Option<Archive>> {
    if is_rar(bytes) {
        debug!(size = bytes.len(), "identified rar archive");
        return Ok(Some(Archive::Rar(RarBuffer::new(bytes)?)));
    }

    match ZipBuffer::open(bytes.to_vec()) {
        Some(zip) => {
            debug!("identified zip archive");
            Ok(Some(Archive::Zip(zip)))
        }
        None => {
            debug!("payload is not an archive");
            Ok(None)
        }
    }
}

fn is_rar(bytes: &[u8]) -> bool {
    bytes.starts_with(RAR4_SIGNATURE) || bytes.starts_with(RAR5_SIGNATURE)
}

impl Archive {
    /// Container format
    pub fn kind(&self) -> ArchiveType {
        match self {
            Archive::Rar(_) => ArchiveType::Rar,
            Archive::Zip(_) => ArchiveType::Zip,
        }
    }

    /// Names of the file members, directories and unsafe paths excluded
    pub fn member_names(&mut self) -> std::result::Result<Vec<String>, ArchiveError> {
        match self {
            Archive::Rar(rar) => rar.member_names(),
            Archive::Zip(zip) => zip.member_names(),
        }
    }

    /// Read one member fully into memory
    pub fn read_member(&mut self, name: &str) -> std::result::Result<Vec<u8>, ArchiveError> {
        match self {
            Archive::Rar(rar) => rar.read_member(name),
            Archive::Zip(zip) => zip.read_member(name),
        }
    }

    /// Pick the subtitle for `episode` and return its name and bytes
    pub fn extract_subtitle(
        &mut self,
        episode: Option<u32>,
        selector: &dyn MemberSelector,
    ) -> std::result::Result<(String, Vec<u8>), ArchiveError> {
        let names = self.member_names()?;
        let chosen = selector
            .select(&names, episode)
            .ok_or(ArchiveError::NoSubtitleMember { count: names.len() })?
            .to_string();

        debug!(member = %chosen, ?episode, kind = ?self.kind(), "selected archive member");
        let content = self.read_member(&chosen)?;
        Ok((chosen, content))
    }
}
