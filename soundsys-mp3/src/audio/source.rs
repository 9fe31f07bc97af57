//! Compressed audio sources
//!
//! A [`SourceLocator`] can be opened any number of times, each open yielding
//! an independent stream positioned at the start. Initialization relies on
//! this: the first frame is probed on one stream and decoding runs on another.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An open compressed byte stream
pub trait SourceStream: Read + Seek + Send + Sync {
    /// Total length in bytes, if known
    fn byte_len(&self) -> Option<u64> {
        None
    }
}

impl SourceStream for File {
    fn byte_len(&self) -> Option<u64> {
        self.metadata().ok().map(|m| m.len())
    }
}

impl SourceStream for Cursor<Arc<[u8]>> {
    fn byte_len(&self) -> Option<u64> {
        Some(self.get_ref().len() as u64)
    }
}

/// Locates a compressed audio resource and opens streams over it
pub trait SourceLocator: Send + Sync + fmt::Debug {
    /// Open a new stream positioned at the start of the resource
    fn open(&self) -> io::Result<Box<dyn SourceStream>>;

    /// Human-readable name for log messages
    fn describe(&self) -> String;

    /// File extension used as a format hint
    fn extension(&self) -> Option<String> {
        None
    }
}

/// A compressed file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceLocator for FileSource {
    fn open(&self) -> io::Result<Box<dyn SourceStream>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(file))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Compressed bytes held in memory, shared between opens
#[derive(Clone)]
pub struct MemorySource {
    name: String,
    bytes: Arc<[u8]>,
    extension: Option<String>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            extension: None,
        }
    }

    /// Attach a format hint, e.g. `"mp3"`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("extension", &self.extension)
            .finish()
    }
}

impl SourceLocator for MemorySource {
    fn open(&self) -> io::Result<Box<dyn SourceStream>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn extension(&self) -> Option<String> {
        self.extension.clone()
    }
}
