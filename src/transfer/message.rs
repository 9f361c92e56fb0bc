//! File-transfer messages
//!
//! The file-transfer variant uses a simpler framing than the transaction
//! protocol: a 1-byte kind, a 4-byte big-endian data length (data only, not
//! the whole frame), then the data.

use std::fmt;

/// Message kind byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Client asks for the file list
    ListFiles,

    /// Server answers with the file list
    FileList,

    /// Client asks for one file by name
    DownloadFile,

    /// Server answers with the file content
    FileData,

    /// Server-side failure, data is a description
    Error,

    /// Generic success acknowledgement
    Success,

    /// Unrecognized kind byte; decoded verbatim, answered with Error
    Other(u8),
}

impl TransferKind {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => TransferKind::ListFiles,
            2 => TransferKind::FileList,
            3 => TransferKind::DownloadFile,
            4 => TransferKind::FileData,
            5 => TransferKind::Error,
            6 => TransferKind::Success,
            other => TransferKind::Other(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TransferKind::ListFiles => 1,
            TransferKind::FileList => 2,
            TransferKind::DownloadFile => 3,
            TransferKind::FileData => 4,
            TransferKind::Error => 5,
            TransferKind::Success => 6,
            TransferKind::Other(b) => *b,
        }
    }
}

/// One file-transfer frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    pub kind: TransferKind,
    pub data: Vec<u8>,
}

impl TransferMessage {
    pub fn new(kind: TransferKind, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    pub fn text(kind: TransferKind, text: &str) -> Self {
        Self::new(kind, text.as_bytes().to_vec())
    }
}

/// One entry in a file listing.
///
/// Serialized as `name,size,modified` (modified in epoch milliseconds);
/// a listing is entries joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub modified_ms: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, size: u64, modified_ms: u64) -> Self {
        Self {
            name: name.into(),
            size,
            modified_ms,
        }
    }

    /// Parse one `name,size,modified` line; returns None on malformed input
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, ',');
        let name = parts.next()?;
        let size = parts.next()?.parse().ok()?;
        let modified_ms = parts.next()?.parse().ok()?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, size, modified_ms))
    }

    /// Render a listing payload from entries
    pub fn render_listing(entries: &[FileEntry]) -> String {
        entries
            .iter()
            .map(FileEntry::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a listing payload into entries, skipping malformed lines
    pub fn parse_listing(text: &str) -> Vec<FileEntry> {
        text.lines().filter_map(FileEntry::parse).collect()
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.name, self.size, self.modified_ms)
    }
}
