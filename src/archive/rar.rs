use crate::error::ArchiveError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// RAR archive spilled to a scratch file
///
/// `unrar` only reads archives from disk. The scratch file is removed when the
/// buffer is dropped.
#[derive(Debug)]
pub struct RarBuffer {
    file: NamedTempFile,
}

impl RarBuffer {
    /// Write `bytes` to a fresh scratch file
    pub fn new(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!(path = ?file.path(), size = bytes.len(), "spilled rar payload to scratch file");
        Ok(Self { file })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    fn open_error(e: unrar::error::UnrarError) -> ArchiveError {
        ArchiveError::Open {
            format: "RAR",
            reason: e.to_string(),
        }
    }

    /// File member names in archive order
    pub fn member_names(&self) -> Result<Vec<String>, ArchiveError> {
        let listing = unrar::Archive::new(self.path())
            .open_for_listing()
            .map_err(Self::open_error)?;

        let mut names = Vec::new();
        for header in listing {
            let header = header.map_err(Self::open_error)?;
            if header.is_directory() || !is_safe(&header.filename) {
                continue;
            }
            names.push(header.filename.to_string_lossy().into_owned());
        }
        Ok(names)
    }

    /// Read a member by name
    pub fn read_member(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let read_error = |reason: String| ArchiveError::Read {
            member: name.to_string(),
            reason,
        };

        let mut at_header = unrar::Archive::new(self.path())
            .open_for_processing()
            .map_err(Self::open_error)?;

        while let Some(at_file) = at_header
            .read_header()
            .map_err(|e| read_error(e.to_string()))?
        {
            if at_file.entry().filename.to_string_lossy() == name {
                let (content, _) = at_file.read().map_err(|e| read_error(e.to_string()))?;
                return Ok(content);
            }
            at_header = at_file.skip().map_err(|e| read_error(e.to_string()))?;
        }

        Err(read_error("member not found".to_string()))
    }
}

// Reject entries that would escape an extraction root ("../x", "/etc/x")
fn is_safe(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir))
}
