//! Process identity attached to every health report.
//!
//! The identity is computed the first time it is needed and then kept for
//! the rest of the process. Components registered after that first lookup do
//! not show up in later reports.

use std::fmt;
use std::sync::{Arc, RwLock};

use once_cell::sync::{Lazy, OnceCell};
use serde::Serialize;

/// Placeholder used when the program identity cannot be determined.
pub const UNKNOWN_IDENTITY: &str = "NA";

static COMPONENTS: Lazy<Arc<ComponentRegistry>> = Lazy::new(|| {
    let entry = package_identity();
    let registry = ComponentRegistry::new(Some(entry.clone()));
    registry.register(entry);
    Arc::new(registry)
});

static PROCESS_IDENTITY: Lazy<Arc<IdentityCache>> =
    Lazy::new(|| Arc::new(IdentityCache::new(ComponentRegistry::global())));

/// Identity string of this package, `"<name>, Version=<version>"`.
pub fn package_identity() -> String {
    format!(
        "{}, Version={}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// The process-wide identity cache.
pub fn process_identity() -> Arc<IdentityCache> {
    PROCESS_IDENTITY.clone()
}

/// Where identity information comes from.
pub trait IdentitySource: Send + Sync {
    /// Identity of the executing program, if known.
    fn entry_identity(&self) -> Option<String>;

    /// Every component identity currently known to the process.
    fn loaded_components(&self) -> Vec<String>;
}

/// Program and component identities as reported in health documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    /// Executing program identity, or [`UNKNOWN_IDENTITY`].
    pub assembly: String,
    /// Component identities known when the snapshot was taken.
    pub assemblies: Vec<String>,
}

/// Registry of components that make up the running process.
///
/// Binaries register the libraries and subsystems they bring up so they are
/// listed in health reports.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entry: Option<String>,
    components: RwLock<Vec<String>>,
}

impl ComponentRegistry {
    /// Create an empty registry with the given program identity.
    pub fn new(entry: Option<String>) -> Self {
        Self {
            entry,
            components: RwLock::new(Vec::new()),
        }
    }

    /// The process-wide registry, pre-populated with this package.
    pub fn global() -> Arc<ComponentRegistry> {
        COMPONENTS.clone()
    }

    /// Record a component identity. Duplicates are ignored.
    pub fn register(&self, identity: impl Into<String>) {
        let identity = identity.into();
        let mut components = self
            .components
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !components.contains(&identity) {
            components.push(identity);
        }
    }
}

impl IdentitySource for ComponentRegistry {
    fn entry_identity(&self) -> Option<String> {
        self.entry.clone()
    }

    fn loaded_components(&self) -> Vec<String> {
        self.components
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Compute-once, read-many cache of the [`ProcessIdentity`].
pub struct IdentityCache {
    source: Arc<dyn IdentitySource>,
    snapshot: OnceCell<ProcessIdentity>,
}

impl IdentityCache {
    /// Create a cache that will snapshot `source` on first use.
    pub fn new(source: Arc<dyn IdentitySource>) -> Self {
        Self {
            source,
            snapshot: OnceCell::new(),
        }
    }

    /// Return the snapshot, computing it if this is the first access.
    ///
    /// Concurrent first callers block until one of them has computed it;
    /// the source is consulted exactly once.
    pub fn get(&self) -> &ProcessIdentity {
        self.snapshot.get_or_init(|| ProcessIdentity {
            assembly: self
                .source
                .entry_identity()
                .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string()),
            assemblies: self.source.loaded_components(),
        })
    }

    /// Return the snapshot without computing it.
    pub fn peek(&self) -> Option<&ProcessIdentity> {
        self.snapshot.get()
    }

    /// Drop the snapshot so the next [`get`](Self::get) recomputes it.
    pub fn reset(&mut self) {
        self.snapshot.take();
    }
}

impl fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("snapshot", &self.snapshot.get())
            .finish_non_exhaustive()
    }
}
