//! Read-Through Artifact Cache
//!
//! Entries are keyed by path and stamped with the file's modification time
//! and length. Every lookup re-stats the file and reloads on any change, so a
//! replaced artifact is picked up on the next call. The remaining staleness
//! window is a rewrite that keeps the same length within the filesystem's
//! mtime resolution. A file that has disappeared is reported as missing even
//! if an older copy is cached.

use crate::artifact::{ArtifactLoader, Model, Preprocessor};
use crate::InferenceError;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, InferenceError> {
        let metadata = fs::metadata(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                InferenceError::ArtifactNotFound {
                    path: path.to_path_buf(),
                    source,
                }
            } else {
                InferenceError::ArtifactIo {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Loaded artifacts keyed by path
pub struct ArtifactCache<T: ?Sized> {
    entries: Mutex<HashMap<PathBuf, (Fingerprint, Arc<T>)>>,
}

impl<T: ?Sized> ArtifactCache<T> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, (Fingerprint, Arc<T>)>> {
        // Entries are replaced whole, so a poisoned map is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached artifact for `path` if the file is unchanged,
    /// otherwise load it with `load` and cache the result
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<T>, InferenceError>
    where
        F: FnOnce(&Path) -> Result<Arc<T>, InferenceError>,
    {
        let fingerprint = match Fingerprint::of(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.invalidate(path);
                return Err(e);
            }
        };

        if let Some((cached, value)) = self.entries().get(path) {
            if *cached == fingerprint {
                debug!("Artifact cache hit for {}", path.display());
                return Ok(Arc::clone(value));
            }
            info!("Artifact at {} changed on disk, reloading", path.display());
        }

        let loaded = load(path);
        let mut entries = self.entries();
        match &loaded {
            Ok(value) => {
                entries.insert(path.to_path_buf(), (fingerprint, Arc::clone(value)));
            }
            Err(_) => {
                entries.remove(path);
            }
        }
        loaded
    }

    /// Drop the entry for `path`, returning whether one existed
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries().remove(path).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of cached artifacts
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl<T: ?Sized> Default for ArtifactCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a loader with per-path read-through caching
pub struct CachedArtifactLoader<L> {
    inner: L,
    preprocessors: ArtifactCache<dyn Preprocessor>,
    models: ArtifactCache<dyn Model>,
}

impl<L: ArtifactLoader> CachedArtifactLoader<L> {
    /// Cache artifacts produced by `inner`
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            preprocessors: ArtifactCache::new(),
            models: ArtifactCache::new(),
        }
    }

    /// Force the next load of `path` to go to the wrapped loader
    pub fn invalidate(&self, path: &Path) {
        self.preprocessors.invalidate(path);
        self.models.invalidate(path);
    }

    /// Drop every cached artifact
    pub fn clear(&self) {
        self.preprocessors.clear();
        self.models.clear();
    }

    /// Number of cached artifacts
    pub fn len(&self) -> usize {
        self.preprocessors.len() + self.models.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ArtifactLoader> ArtifactLoader for CachedArtifactLoader<L> {
    fn load_preprocessor(&self, path: &Path) -> Result<Arc<dyn Preprocessor>, InferenceError> {
        self.preprocessors
            .get_or_load(path, |p| self.inner.load_preprocessor(p))
    }

    fn load_model(&self, path: &Path) -> Result<Arc<dyn Model>, InferenceError> {
        self.models.get_or_load(path, |p| self.inner.load_model(p))
    }
}
