//! Download sinks.

use super::{DownloadArtifact, DownloadSink};
use crate::error::ExportError;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Upper bound on `-N` suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// The user's Downloads directory, or the current directory when unknown.
pub fn default_download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes artifacts into a directory without overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, artifact: &DownloadArtifact) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::WriteFailed {
            path: self.dir.clone(),
            source,
        })?;

        let (stem, ext) = split_name(&artifact.file_name);
        let mut last_err = None;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match (attempt, ext) {
                (0, _) => artifact.file_name.clone(),
                (n, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
                (n, None) => format!("{}-{}", stem, n),
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(artifact.contents.as_bytes())
                        .map_err(|source| ExportError::WriteFailed {
                            path: path.clone(),
                            source,
                        })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    last_err = Some(e);
                }
                Err(source) => return Err(ExportError::WriteFailed { path, source }),
            }
        }

        Err(ExportError::WriteFailed {
            path: self.dir.join(&artifact.file_name),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "no free file name")
            }),
        })
    }
}

fn split_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

/// Keeps artifacts in memory; the returned path is the bare file name.
#[derive(Debug, Default)]
pub struct MemoryDownloads {
    saved: Mutex<Vec<DownloadArtifact>>,
}

impl MemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<DownloadArtifact> {
        self.saved.lock().clone()
    }
}

impl DownloadSink for MemoryDownloads {
    fn save(&self, artifact: &DownloadArtifact) -> Result<PathBuf, ExportError> {
        self.saved.lock().push(artifact.clone());
        Ok(PathBuf::from(&artifact.file_name))
    }
}
