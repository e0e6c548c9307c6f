use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gap_core::{ErrorInfo, GapError};
use tracing::info;

use crate::algorithm::Algorithm;
use crate::manifest::AlgorithmManifest;

/// Owns the live algorithm instances, at most one per code.
///
/// The registry is not `Clone`; share it behind an `Arc` so that every
/// holder sees the same instances:
///
/// ```compile_fail
/// let registry = gap_algo::AlgorithmRegistry::new("algos");
/// let _second: gap_algo::AlgorithmRegistry = registry.clone();
/// ```
#[derive(Debug)]
pub struct AlgorithmRegistry {
    root: PathBuf,
    algorithms: BTreeMap<String, Algorithm>,
}

impl AlgorithmRegistry {
    /// Empty registry resolving environments under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            algorithms: BTreeMap::new(),
        }
    }

    /// Builds a registry from `manifests`, failing on the first invalid or
    /// duplicate entry.
    pub fn from_manifests<I>(root: impl Into<PathBuf>, manifests: I) -> Result<Self, GapError>
    where
        I: IntoIterator<Item = AlgorithmManifest>,
    {
        let mut registry = Self::new(root);
        for manifest in manifests {
            registry.instantiate(manifest)?;
        }
        Ok(registry)
    }

    /// Algorithms root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates `manifest` and registers the resulting instance.
    pub fn instantiate(&mut self, manifest: AlgorithmManifest) -> Result<&Algorithm, GapError> {
        if self.algorithms.contains_key(&manifest.code) {
            return Err(GapError::Config(
                ErrorInfo::new(
                    "gap_algo.duplicate_instance",
                    "second instance per algorithm is not allowed",
                )
                .with_context("code", manifest.code.clone())
                .with_hint("release the live instance before creating another"),
            ));
        }
        let algorithm = Algorithm::new(&self.root, manifest)?;
        let code = algorithm.code().to_string();
        Ok(self.algorithms.entry(code).or_insert(algorithm))
    }

    /// Drops the live instance of `code`, allowing a new one.
    pub fn release(&mut self, code: &str) -> Option<Algorithm> {
        self.algorithms.remove(code)
    }

    /// Live instance of `code`.
    pub fn get(&self, code: &str) -> Option<&Algorithm> {
        self.algorithms.get(code)
    }

    /// Whether `code` has a live instance.
    pub fn contains(&self, code: &str) -> bool {
        self.algorithms.contains_key(code)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    /// Whether no instance is live.
    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Instances ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &Algorithm> {
        self.algorithms.values()
    }

    /// Registered codes, sorted.
    pub fn codes(&self) -> Vec<String> {
        self.algorithms.keys().cloned().collect()
    }

    /// Keeps only the codes in `enabled`; an empty list keeps everything.
    /// Returns the requested codes that are not registered.
    pub fn retain_enabled(&mut self, enabled: &[String]) -> Vec<String> {
        if enabled.is_empty() {
            return Vec::new();
        }
        self.algorithms.retain(|code, _| enabled.contains(code));
        enabled
            .iter()
            .filter(|code| !self.algorithms.contains_key(*code))
            .cloned()
            .collect()
    }

    /// Removes transient input and output files of every algorithm.
    pub fn purge_all(&self) -> Result<(), GapError> {
        for algorithm in self.algorithms.values() {
            algorithm.cleanup()?;
        }
        info!(count = self.algorithms.len(), "purged algorithm folders");
        Ok(())
    }

    /// Removes outputs that a previous interrupted run left uncollected.
    pub fn clean_staging(&self) -> Result<(), GapError> {
        for algorithm in self.algorithms.values() {
            algorithm.clean_outputs()?;
        }
        Ok(())
    }
}
