use std::fs;
use std::path::Path;

use gap_core::{ErrorInfo, GapError};
use walkdir::WalkDir;

use crate::manifest::AlgorithmManifest;

/// Reads and validates one manifest file.
pub fn load_manifest(path: &Path) -> Result<AlgorithmManifest, GapError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        GapError::Config(
            ErrorInfo::new(
                "gap_algo.read_manifest",
                format!("failed to read manifest: {err}"),
            )
            .with_context("path", path.display().to_string()),
        )
    })?;
    let manifest: AlgorithmManifest = toml::from_str(&contents).map_err(|err| {
        GapError::Serde(
            ErrorInfo::new("gap_algo.parse_manifest", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Loads every `*.toml` manifest below `dir`, sorted by file path.
pub fn load_manifest_dir(dir: &Path) -> Result<Vec<AlgorithmManifest>, GapError> {
    if !dir.is_dir() {
        return Err(GapError::Config(
            ErrorInfo::new("gap_algo.manifest_dir", "manifest directory does not exist")
                .with_context("path", dir.display().to_string()),
        ));
    }
    let mut manifests = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            GapError::Io(
                ErrorInfo::new("gap_algo.manifest_dir", err.to_string())
                    .with_context("path", dir.display().to_string()),
            )
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            manifests.push(load_manifest(path)?);
        }
    }
    Ok(manifests)
}
