//! Purpose: Filtering facade over an underlying resource search.
//! Exports: `Resolver`, `DiscoveryLocations`, default location constants.
//! Role: Classifies requested names, applies the matching filter, and
//! materializes rewritten resources to transient locations.
//! Invariants: Unchanged resources are returned by reference, never copied.
//! Invariants: A failure on one resource never aborts enumeration of others.
//! Invariants: No caching; every call re-reads and re-filters.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::error;

use crate::core::error::{Error, ErrorKind};
use crate::core::exclusions::ExclusionSet;
use crate::core::modlet::filter_modlets;
use crate::core::providers::filter_providers;
use crate::core::search::ResourceSearch;

pub const DEFAULT_PROVIDER_LOCATION: &str = "meta/services/modlet-providers";
pub const DEFAULT_MODLET_LOCATION: &str = "meta/modlets.json";

/// The two well-known discovery resource names, used as substring match keys.
#[derive(Clone, Debug)]
pub struct DiscoveryLocations {
    provider_location: String,
    modlet_location: String,
}

impl DiscoveryLocations {
    pub fn new(provider_location: impl Into<String>, modlet_location: impl Into<String>) -> Self {
        Self {
            provider_location: provider_location.into(),
            modlet_location: modlet_location.into(),
        }
    }

    pub fn provider_location(&self) -> &str {
        &self.provider_location
    }

    pub fn modlet_location(&self) -> &str {
        &self.modlet_location
    }
}

impl Default for DiscoveryLocations {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER_LOCATION, DEFAULT_MODLET_LOCATION)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Category {
    Provider,
    Modlet,
    PassThrough,
}

/// Exclusion-aware resource resolver wrapping an underlying search.
///
/// Holds no mutable state beyond its immutable configuration, so shared
/// references may be used from multiple threads; each materialization picks
/// a fresh uniquely named location.
#[derive(Debug)]
pub struct Resolver<S> {
    search: S,
    exclusions: ExclusionSet,
    locations: DiscoveryLocations,
}

impl<S: ResourceSearch> Resolver<S> {
    pub fn new(search: S, exclusions: ExclusionSet, locations: DiscoveryLocations) -> Self {
        Self {
            search,
            exclusions,
            locations,
        }
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn locations(&self) -> &DiscoveryLocations {
        &self.locations
    }

    /// Resolves one resource; filtered categories may resolve to a
    /// materialized location. Read, parse, or write failures are logged and
    /// collapse to "not found" for this one resource.
    pub fn find_resource(&self, name: &str) -> Option<PathBuf> {
        let path = self.search.find_one(name)?;
        self.apply(name, path)
    }

    /// Resolves every match for `name`, lazily: each element is filtered
    /// only when the iterator is pulled, and a failing element is skipped
    /// while enumeration continues.
    pub fn find_resources<'a>(&'a self, name: &str) -> impl Iterator<Item = PathBuf> + use<'a, S> {
        let name = name.to_string();
        self.search
            .find_all(&name)
            .filter_map(move |path| self.apply(&name, path))
    }

    fn classify(&self, name: &str) -> Category {
        if name.contains(self.locations.provider_location()) {
            Category::Provider
        } else if name.contains(self.locations.modlet_location()) {
            Category::Modlet
        } else {
            Category::PassThrough
        }
    }

    fn apply(&self, name: &str, path: PathBuf) -> Option<PathBuf> {
        let category = self.classify(name);
        if category == Category::PassThrough {
            return Some(path);
        }
        match self.filter_resource(name, category, &path) {
            Ok(location) => Some(location),
            Err(err) => {
                error!(
                    resource = name,
                    path = %path.display(),
                    error = %err,
                    "failed to filter discovery resource; treating it as absent"
                );
                None
            }
        }
    }

    fn filter_resource(
        &self,
        name: &str,
        category: Category,
        path: &Path,
    ) -> Result<PathBuf, Error> {
        let bytes = std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read discovery resource")
                .with_resource(name)
                .with_path(path)
                .with_source(err)
        })?;

        let filtered = match category {
            Category::Provider => {
                let result = filter_providers(name, &bytes, &self.exclusions.providers);
                if !result.changed() {
                    return Ok(path.to_path_buf());
                }
                result.to_bytes()
            }
            Category::Modlet => {
                let result = filter_modlets(name, &bytes, &self.exclusions)?;
                if !result.changed() {
                    return Ok(path.to_path_buf());
                }
                result.to_bytes()?
            }
            Category::PassThrough => return Ok(path.to_path_buf()),
        };

        materialize(name, &filtered)
    }
}

/// Writes filtered content to a fresh uniquely named file in the OS temp
/// directory and returns its location. Uniqueness comes from a random hex
/// suffix plus `create_new`, so concurrent materializations cannot collide.
/// Cleanup is left to the OS temp policy.
fn materialize(resource: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
    let base = resource.rsplit('/').next().unwrap_or(resource);
    for _ in 0..16 {
        let mut raw = [0u8; 8];
        getrandom::fill(&mut raw).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message(format!("random source unavailable: {err}"))
                .with_resource(resource)
        })?;
        let suffix: String = raw.iter().map(|byte| format!("{byte:02x}")).collect();
        let path = std::env::temp_dir().join(format!("modsift-{suffix}-{base}"));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message("failed to materialize filtered resource")
                    .with_resource(resource)
                    .with_path(&path)
                    .with_source(err));
            }
        };
        file.write_all(bytes).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write filtered resource")
                .with_resource(resource)
                .with_path(&path)
                .with_source(err)
        })?;
        return Ok(path);
    }
    Err(Error::new(ErrorKind::Internal)
        .with_message("could not pick a unique transient location")
        .with_resource(resource))
}
