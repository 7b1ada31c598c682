//! Recursive discovery of audio files

use crate::error::{FilesError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions treated as playable audio
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Walks a directory tree collecting audio files
#[derive(Debug, Clone, Default)]
pub struct FileScanner {
    /// Maximum depth to traverse (unlimited if `None`)
    max_depth: Option<usize>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan a directory for audio files
    ///
    /// # Returns
    ///
    /// Audio file paths found, sorted
    pub fn scan_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(FilesError::NotFound(path.display().to_string()));
        }

        if !path.is_dir() {
            return Err(FilesError::NotADirectory(path.display().to_string()));
        }

        let mut walker = WalkDir::new(path);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut audio_files = Vec::new();
        for entry in walker.into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping entry while scanning {}: {}", path.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && is_audio_file(entry.path()) {
                audio_files.push(entry.into_path());
            }
        }

        audio_files.sort();
        tracing::debug!(
            "Found {} audio files under {}",
            audio_files.len(),
            path.display()
        );

        Ok(audio_files)
    }
}

/// Check if a file has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}
