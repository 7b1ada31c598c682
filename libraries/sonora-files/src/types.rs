//! File listing and metadata types

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Seek};
use std::time::UNIX_EPOCH;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name without directories
    pub name: String,

    /// Path relative to the provider root, `/`-separated
    pub path: String,

    pub is_directory: bool,

    /// Size in bytes (0 for directories)
    pub size: u64,

    /// Last modification, seconds since the Unix epoch (0 if unknown)
    pub modified: u64,
}

/// Metadata for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub size: u64,
    pub modified: u64,
    pub mime_type: String,
}

/// Readable, seekable byte stream returned by `open_file`
pub trait InputStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> InputStream for T {}

/// Modification time of `metadata` as Unix seconds
pub(crate) fn modified_secs(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |since| since.as_secs())
}
