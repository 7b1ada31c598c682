//! Sonora - Library File Access
//!
//! Root-relative access to the music library on disk.
//!
//! This crate provides:
//! - [`FileProvider`] trait with blocking and async operations
//! - [`LocalFileProvider`] serving a local directory, confined to its root
//! - [`FileScanner`] for recursive audio file discovery
//!
//! # Example
//!
//! ```rust,no_run
//! use sonora_files::{FileProvider, LocalFileProvider};
//!
//! let provider = LocalFileProvider::new("./music");
//! let metadata = provider.file_metadata("album/01.mp3").unwrap();
//! assert_eq!(metadata.mime_type, "audio/mpeg");
//!
//! for track in provider.scan_audio_files("").unwrap() {
//!     println!("{}", track.display());
//! }
//! ```

mod error;
mod provider;
mod scanner;
mod types;

// Public exports
pub use error::{FilesError, Result};
pub use provider::{FileProvider, LocalFileProvider};
pub use scanner::{is_audio_file, FileScanner, AUDIO_EXTENSIONS};
pub use types::{FileInfo, FileMetadata, InputStream};
