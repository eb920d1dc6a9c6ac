//! Pack store: loading, registration, tenant pinning, and resolution.
//!
//! Two failure modes, deliberately split:
//! - `load` / `bootstrap` fail loud with a [`PackError`] — an operator is
//!   configuring a pack and needs the specific problem named;
//! - `resolve` fails soft with a logged `None` — a pipeline needs *a* pack
//!   to proceed and falls back to the default.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pulse_core::errors::PackError;
use pulse_core::types::{PackKey, TenantId};
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::defaults;
use crate::schema::{Pack, PackDocument, Taxonomy};
use crate::taxonomy::canonical_taxonomy;
use crate::validate;

/// Registry of validated packs plus tenant pins.
///
/// Packs are immutable once inserted (`Arc<Pack>`, no mutation API); a new
/// version is a new entry. Re-pinning a tenant affects only future
/// resolutions — nothing here recomputes history.
pub struct PackStore {
    canonical: Taxonomy,
    packs: FxHashMap<PackKey, Arc<Pack>>,
    pins: FxHashMap<TenantId, PackKey>,
    default_key: PackKey,
}

impl PackStore {
    /// Create a store seeded with the canonical taxonomy and the default pack.
    pub fn new() -> Self {
        let default = defaults::default_pack();
        let default_key = default.key();
        let mut packs = FxHashMap::default();
        packs.insert(default_key.clone(), Arc::new(default));
        Self {
            canonical: canonical_taxonomy(),
            packs,
            pins: FxHashMap::default(),
            default_key,
        }
    }

    /// Load every `*.toml` pack under `dir` at process startup.
    ///
    /// Any failure here is fatal to the caller: scoring correctness depends
    /// on the configured packs being present and valid, so the process must
    /// refuse to begin serving rather than run with a partial store.
    pub fn bootstrap(dir: &Path) -> Result<Self, PackError> {
        let mut store = Self::new();
        let entries = fs::read_dir(dir).map_err(|e| PackError::FileNotFound {
            path: format!("{} ({e})", dir.display()),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| PackError::FileNotFound {
                path: format!("{} ({e})", dir.display()),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                store.load(&path)?;
            }
        }
        info!(packs = store.packs.len(), "pack store bootstrapped");
        Ok(store)
    }

    /// Load, validate, and register one pack file. Fails loud.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Pack>, PackError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PackError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                PackError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        let doc: PackDocument = toml::from_str(&raw).map_err(|e| PackError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let pack = validate::resolve(doc, &self.canonical)?;
        info!(pack = %pack.key(), path = %path.display(), "pack loaded");
        Ok(self.insert(pack))
    }

    /// Register an already-validated pack.
    pub fn insert(&mut self, pack: Pack) -> Arc<Pack> {
        let key = pack.key();
        let pack = Arc::new(pack);
        self.packs.insert(key, Arc::clone(&pack));
        pack
    }

    /// Pin a tenant to exactly one pack+version. No auto-upgrade: the pin
    /// stays until an operator moves it.
    pub fn pin(&mut self, tenant: TenantId, key: PackKey) -> Result<(), PackError> {
        if !self.packs.contains_key(&key) {
            return Err(PackError::UnknownPack {
                key: key.to_string(),
            });
        }
        info!(tenant = %tenant, pack = %key, "tenant pinned");
        self.pins.insert(tenant, key);
        Ok(())
    }

    /// Resolve the pack for a tenant. Never raises: a missing or broken pin
    /// is logged and yields `None` so the caller can fall back to
    /// [`PackStore::default_pack`].
    pub fn resolve(&self, tenant: &TenantId) -> Option<Arc<Pack>> {
        let key = match self.pins.get(tenant) {
            Some(key) => key,
            None => {
                warn!(tenant = %tenant, "tenant has no pack pin");
                return None;
            }
        };
        match self.packs.get(key) {
            Some(pack) => Some(Arc::clone(pack)),
            None => {
                warn!(tenant = %tenant, pack = %key, "tenant pinned to missing pack");
                None
            }
        }
    }

    /// Look up a pack by key.
    pub fn get(&self, key: &PackKey) -> Option<Arc<Pack>> {
        self.packs.get(key).map(Arc::clone)
    }

    /// The always-available default pack.
    pub fn default_pack(&self) -> Arc<Pack> {
        Arc::clone(&self.packs[&self.default_key])
    }
}

impl Default for PackStore {
    fn default() -> Self {
        Self::new()
    }
}
