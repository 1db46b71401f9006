//! Locating and caching the registry document.

use crate::{Registry, RegistryError, load_registry_from_str};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Registry baked into the library at compile time.
/// Present when `data/registry.json` (or the workspace `shared/` copy)
/// existed during `cargo build`.
#[cfg(has_embedded_registry)]
const EMBEDDED_REGISTRY_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/registry.json"));

/// Return the embedded registry document when compiled in, `None` otherwise.
#[cfg(has_embedded_registry)]
pub fn embedded_registry_json() -> Option<&'static str> {
    Some(EMBEDDED_REGISTRY_JSON)
}

/// Return the embedded registry document when compiled in, `None` otherwise.
#[cfg(not(has_embedded_registry))]
pub fn embedded_registry_json() -> Option<&'static str> {
    None
}

/// One place a registry may be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// A JSON/JSONC file on disk.
    File(PathBuf),
    /// The registry embedded at build time.
    Embedded,
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::File(path) => write!(f, "{}", path.display()),
            RegistrySource::Embedded => write!(f, "<embedded>"),
        }
    }
}

impl RegistrySource {
    fn read(&self) -> Result<Option<Registry>, RegistryError> {
        match self {
            RegistrySource::File(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
                    path: path.clone(),
                    source,
                })?;
                load_registry_from_str(&text).map(Some)
            }
            RegistrySource::Embedded => embedded_registry_json()
                .map(load_registry_from_str)
                .transpose(),
        }
    }
}

/// Loads the registry from an ordered list of candidate locations.
///
/// The first candidate that exists **and** parses wins; a candidate that
/// exists but is malformed is logged and skipped. The result is cached in the
/// loader: later calls to [`RegistryLoader::load`] return the same
/// `Arc<Registry>` without touching the filesystem. There is no reload; build
/// a new loader to pick up a changed file.
///
/// The loader is an explicit handle rather than process-global state, so
/// callers decide its lifetime and share it (or the loaded `Arc`) as needed.
#[derive(Debug)]
pub struct RegistryLoader {
    candidates: Vec<RegistrySource>,
    cache: OnceLock<(Arc<Registry>, RegistrySource)>,
}

impl RegistryLoader {
    /// Loader over an explicit candidate list, tried in order.
    pub fn new(candidates: Vec<RegistrySource>) -> Self {
        Self {
            candidates,
            cache: OnceLock::new(),
        }
    }

    /// Default candidate list for a project rooted at `root`:
    ///
    /// 1. `<root>/registry.json`
    /// 2. `<root>/shared/registry.json`
    /// 3. `<root>/../shared/registry.json`
    /// 4. the embedded registry
    pub fn for_workspace(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(vec![
            RegistrySource::File(root.join("registry.json")),
            RegistrySource::File(root.join("shared").join("registry.json")),
            RegistrySource::File(root.join("..").join("shared").join("registry.json")),
            RegistrySource::Embedded,
        ])
    }

    /// Loader for a single explicit file, without any fallback.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![RegistrySource::File(path.into())])
    }

    /// Loader that only uses the embedded registry.
    pub fn embedded() -> Self {
        Self::new(vec![RegistrySource::Embedded])
    }

    /// Candidate locations in the order they are tried.
    pub fn candidates(&self) -> &[RegistrySource] {
        &self.candidates
    }

    /// Where the cached registry came from, once loaded.
    pub fn loaded_from(&self) -> Option<&RegistrySource> {
        self.cache.get().map(|(_, source)| source)
    }

    /// Load the registry, or return the cached copy.
    ///
    /// Fails with [`RegistryError::Unavailable`] when no candidate yields a
    /// valid registry.
    pub fn load(&self) -> Result<Arc<Registry>, RegistryError> {
        if let Some((registry, _)) = self.cache.get() {
            return Ok(Arc::clone(registry));
        }

        for candidate in &self.candidates {
            match candidate.read() {
                Ok(Some(registry)) => {
                    tracing::debug!(source = %candidate, "loaded registry");
                    // First successful load wins if another thread raced us.
                    let (cached, _) = self
                        .cache
                        .get_or_init(|| (Arc::new(registry), candidate.clone()));
                    return Ok(Arc::clone(cached));
                }
                Ok(None) => tracing::debug!(source = %candidate, "registry candidate not present"),
                Err(err) => {
                    tracing::warn!(source = %candidate, error = %err, "skipping unusable registry");
                }
            }
        }

        let tried: Vec<String> = self.candidates.iter().map(ToString::to_string).collect();
        tracing::warn!(tried = ?tried, "no registry available");
        Err(RegistryError::Unavailable { tried })
    }
}
