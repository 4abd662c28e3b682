//! Single-slot staging area for the file awaiting metadata analysis.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest file accepted for analysis: 16 MiB.
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Extensions the metadata service knows how to analyze.
pub const ALLOWED_EXTENSIONS: [&str; 15] = [
    "pdf", "docx", "doc", "xlsx", "xls", "txt", "log", "md", "jpg", "jpeg", "png", "gif", "bmp",
    "tiff", "webp",
];

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("File is too large: {size} (maximum is {})", format_size(MAX_FILE_SIZE))]
    TooLarge { size: String },
    #[error("Unsupported file type: .{0}")]
    UnsupportedExtension(String),
    #[error("File has no extension: {0}")]
    MissingExtension(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
}

/// Where the file content lives until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file the user picked, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    name: String,
    size_bytes: u64,
    source: FileSource,
}

impl FileCandidate {
    /// Describes a file on disk. Only metadata is read here.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StagingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StagingError::FileNotFound(path.to_path_buf()));
        }
        let size_bytes = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size_bytes,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Checks size and extension, producing a stageable file.
    pub fn validate(self) -> Result<StagedFile, StagingError> {
        if self.size_bytes > MAX_FILE_SIZE {
            return Err(StagingError::TooLarge {
                size: format_size(self.size_bytes),
            });
        }
        let extension = extension_of(&self.name)
            .ok_or_else(|| StagingError::MissingExtension(self.name.clone()))?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(StagingError::UnsupportedExtension(extension));
        }
        Ok(StagedFile {
            name: self.name,
            extension,
            size_bytes: self.size_bytes,
            source: self.source,
        })
    }
}

/// Lowercased substring after the last `.`, if any.
fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// A validated file: at most 16 MiB with an allowed extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    extension: String,
    size_bytes: u64,
    source: FileSource,
}

impl StagedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

/// Holds at most one staged file.
#[derive(Debug, Default)]
pub struct FileStagingArea {
    slot: Option<StagedFile>,
}

impl FileStagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stages the candidate, replacing any previous file.
    /// On rejection the current slot is left untouched.
    pub fn select(&mut self, candidate: FileCandidate) -> Result<&StagedFile, StagingError> {
        match candidate.validate() {
            Ok(file) => {
                #[cfg(feature = "tracing")]
                tracing::info!("Staged file {} ({} bytes)", file.name, file.size_bytes);
                Ok(&*self.slot.insert(file))
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Rejected file: {}", e);
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Hands the staged file to a submission, leaving the slot empty.
    pub fn take(&mut self) -> Option<StagedFile> {
        self.slot.take()
    }

    /// Puts a file back after a failed submission. A file staged in the
    /// meantime wins; returns whether the file was put back.
    pub fn restore(&mut self, file: StagedFile) -> bool {
        if self.slot.is_some() {
            return false;
        }
        self.slot = Some(file);
        true
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// Formats a byte count with two decimals, e.g. `1.50 MB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}
