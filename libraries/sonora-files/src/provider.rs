//! File providers
//!
//! A [`FileProvider`] exposes one storage location through root-relative,
//! `/`-separated paths. [`LocalFileProvider`] serves a directory on the
//! local file system.

use crate::error::{FilesError, Result};
use crate::scanner::FileScanner;
use crate::types::{modified_secs, FileInfo, FileMetadata, InputStream};
use async_trait::async_trait;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// MIME type reported when the extension is unknown
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Access to a tree of files addressed relative to a root
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// List a directory, directories first, then by name
    ///
    /// A missing directory yields an empty list.
    fn list_files(&self, directory: &str) -> Result<Vec<FileInfo>>;

    /// Open a file for reading
    fn open_file(&self, path: &str) -> Result<Box<dyn InputStream>>;

    /// Size, modification time and MIME type of a file
    fn file_metadata(&self, path: &str) -> Result<FileMetadata>;

    async fn list_files_async(&self, directory: &str) -> Result<Vec<FileInfo>>;

    async fn open_file_async(&self, path: &str) -> Result<Box<dyn InputStream>>;

    async fn file_metadata_async(&self, path: &str) -> Result<FileMetadata>;
}

/// Provider for a directory on the local file system
///
/// # Example
///
/// ```rust,no_run
/// use sonora_files::{FileProvider, LocalFileProvider};
///
/// let provider = LocalFileProvider::new("/music");
/// for entry in provider.list_files("albums").unwrap() {
///     println!("{}{}", if entry.is_directory { "[DIR] " } else { "" }, entry.name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileProvider {
    root: PathBuf,
}

impl LocalFileProvider {
    /// Create a provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a root-relative path
    ///
    /// Leading separators and `.` are ignored; `..` and drive prefixes are
    /// rejected so the result always lies under the root.
    pub fn full_path(&self, path: &str) -> Result<PathBuf> {
        let parts = normalize(path)?;
        let mut full = self.root.clone();
        full.extend(&parts);
        Ok(full)
    }

    /// Full path of `path` if it names an existing regular file
    pub fn locate(&self, path: &str) -> Option<PathBuf> {
        self.full_path(path).ok().filter(|full| full.is_file())
    }

    /// Recursively collect audio files below `directory`
    pub fn scan_audio_files(&self, directory: &str) -> Result<Vec<PathBuf>> {
        let full = self.full_path(directory)?;
        FileScanner::new().scan_directory(&full)
    }

    /// Async version of [`scan_audio_files`](Self::scan_audio_files)
    pub async fn scan_audio_files_async(&self, directory: &str) -> Result<Vec<PathBuf>> {
        let provider = self.clone();
        let directory = directory.to_string();
        tokio::task::spawn_blocking(move || provider.scan_audio_files(&directory)).await?
    }
}

#[async_trait]
impl FileProvider for LocalFileProvider {
    fn list_files(&self, directory: &str) -> Result<Vec<FileInfo>> {
        let parts = normalize(directory)?;
        let mut full = self.root.clone();
        full.extend(&parts);

        if !full.is_dir() {
            tracing::debug!("Listing missing directory {}", full.display());
            return Ok(Vec::new());
        }

        let prefix = parts.join("/");
        let mut entries = Vec::new();

        for entry in fs::read_dir(&full)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", full.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", name, e);
                    continue;
                }
            };

            let is_directory = metadata.is_dir();
            entries.push(FileInfo {
                path: if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                },
                name,
                is_directory,
                size: if is_directory { 0 } else { metadata.len() },
                modified: modified_secs(&metadata),
            });
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(entries)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn InputStream>> {
        let full = self.full_path(path)?;
        if full.is_dir() {
            return Err(FilesError::NotAFile(path.to_string()));
        }

        match fs::File::open(&full) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FilesError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn file_metadata(&self, path: &str) -> Result<FileMetadata> {
        let full = self.full_path(path)?;
        let metadata = match fs::metadata(&full) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FilesError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            return Err(FilesError::NotAFile(path.to_string()));
        }

        let mime_type = mime_guess::from_path(&full)
            .first()
            .map_or_else(|| DEFAULT_MIME_TYPE.to_string(), |mime| mime.to_string());

        Ok(FileMetadata {
            size: metadata.len(),
            modified: modified_secs(&metadata),
            mime_type,
        })
    }

    async fn list_files_async(&self, directory: &str) -> Result<Vec<FileInfo>> {
        let provider = self.clone();
        let directory = directory.to_string();
        tokio::task::spawn_blocking(move || provider.list_files(&directory)).await?
    }

    async fn open_file_async(&self, path: &str) -> Result<Box<dyn InputStream>> {
        let provider = self.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || provider.open_file(&path)).await?
    }

    async fn file_metadata_async(&self, path: &str) -> Result<FileMetadata> {
        let provider = self.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || provider.file_metadata(&path)).await?
    }
}

/// Split a root-relative path into plain components
fn normalize(path: &str) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(FilesError::OutsideRoot(path.to_string()));
            }
        }
    }
    Ok(parts)
}
