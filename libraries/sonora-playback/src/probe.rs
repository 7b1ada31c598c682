//! Symphonia-backed rendering backend
//!
//! Opens local files and probes their container for the default track's
//! duration. No packets are decoded: audio output stays outside this crate.

use crate::backend::{RenderBackend, RenderResource};
use crate::error::{PlaybackError, Result};
use std::path::Path;
use std::time::Duration;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Opened, probed file
pub struct ProbeResource {
    uri: String,
    duration: Option<Duration>,
    _reader: Box<dyn FormatReader>,
}

impl RenderResource for ProbeResource {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

/// Backend treating track identifiers as local file paths
#[derive(Debug, Default, Clone, Copy)]
pub struct ProbeBackend;

impl ProbeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for ProbeBackend {
    fn open(&self, uri: &str) -> Result<Box<dyn RenderResource>> {
        let path = Path::new(uri);
        if !path.is_file() {
            return Err(PlaybackError::open_failure(uri, "file not found"));
        }

        let file =
            std::fs::File::open(path).map_err(|e| PlaybackError::open_failure(uri, e.to_string()))?;

        // Create media source
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::open_failure(uri, format!("Failed to probe file: {}", e)))?;

        let reader = probed.format;
        let track = reader
            .default_track()
            .ok_or_else(|| PlaybackError::open_failure(uri, "No audio tracks found"))?;

        let params = &track.codec_params;
        let duration = match (params.time_base, params.n_frames, params.sample_rate) {
            (Some(time_base), Some(n_frames), _) => {
                let time = time_base.calc_time(n_frames);
                Some(Duration::from_secs_f64(time.seconds as f64 + time.frac))
            }
            (None, Some(n_frames), Some(sample_rate)) if sample_rate > 0 => {
                Some(Duration::from_secs_f64(n_frames as f64 / f64::from(sample_rate)))
            }
            _ => None,
        };

        tracing::debug!("Probed '{}': duration {:?}", uri, duration);

        Ok(Box::new(ProbeResource {
            uri: uri.to_string(),
            duration,
            _reader: reader,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Minimal 16-bit mono PCM WAV file
    fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
        let data_len = frames * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        bytes
    }

    #[test]
    fn probes_wav_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&wav_bytes(8000, 16000))
            .unwrap();

        let resource = ProbeBackend::new().open(path.to_str().unwrap()).unwrap();
        let duration = resource.duration().unwrap();
        assert!((duration.as_secs_f64() - 2.0).abs() < 0.01, "got {:?}", duration);
    }

    #[test]
    fn missing_file_is_open_failure() {
        let err = ProbeBackend::new()
            .open("/definitely/not/here.mp3")
            .err()
            .unwrap();
        assert!(matches!(err, PlaybackError::OpenFailure { .. }));
    }

    #[test]
    fn garbage_file_is_open_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"this is not audio at all").unwrap();

        let err = ProbeBackend::new().open(path.to_str().unwrap()).err().unwrap();
        assert!(matches!(err, PlaybackError::OpenFailure { .. }));
    }
}
