use crate::error::ArchiveError;
use std::io::{Cursor, Read};
use tracing::warn;

/// Upper bound on the buffer reserved from a member's declared size
const MAX_PREALLOCATION: u64 = 4 * 1024 * 1024;

/// ZIP archive read straight from memory
pub struct ZipBuffer {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for ZipBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipBuffer")
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl ZipBuffer {
    /// Whether the central directory of `bytes` can be read
    pub fn is_zip(bytes: &[u8]) -> bool {
        zip::ZipArchive::new(Cursor::new(bytes)).is_ok()
    }

    /// Open `bytes` as a ZIP archive, `None` if they are not one
    pub fn open(bytes: Vec<u8>) -> Option<Self> {
        zip::ZipArchive::new(Cursor::new(bytes))
            .ok()
            .map(|archive| Self { archive })
    }

    /// File member names in archive order
    pub fn member_names(&mut self) -> Result<Vec<String>, ArchiveError> {
        let mut names = Vec::with_capacity(self.archive.len());

        for i in 0..self.archive.len() {
            let file = self.archive.by_index(i).map_err(|e| ArchiveError::Read {
                member: format!("#{i}"),
                reason: e.to_string(),
            })?;

            if file.is_dir() {
                continue;
            }
            if file.enclosed_name().is_none() {
                warn!(member = file.name(), "skipping zip entry with unsafe path");
                continue;
            }
            names.push(file.name().to_string());
        }

        Ok(names)
    }

    /// Read a member by name
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let read_error = |reason: String| ArchiveError::Read {
            member: name.to_string(),
            reason,
        };

        let mut file = self
            .archive
            .by_name(name)
            .map_err(|e| read_error(e.to_string()))?;

        let mut content = Vec::with_capacity(preallocation(file.size()));
        file.read_to_end(&mut content)
            .map_err(|e| read_error(e.to_string()))?;
        Ok(content)
    }
}

// Declared sizes come from the archive header and may be forged
fn preallocation(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}
