//! Structured error types shared across gapbench crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GapError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, algorithm codes, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the benchmark driver.
///
/// The families follow how a failure must be handled: configuration errors
/// abort the run, execution errors are recoverable by the orchestrator,
/// environment errors abort only the operation that hit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GapError {
    /// Invalid scenario/kind combination, missing dataset, bad algorithm paths.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// An external algorithm or plotting process failed.
    #[error("execution error: {0}")]
    Execution(ErrorInfo),
    /// The filesystem is not in the state an operation requires.
    #[error("environment error: {0}")]
    Environment(ErrorInfo),
    /// Filesystem failures while reading or writing benchmark artefacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Parse and encode failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl GapError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GapError::Config(info)
            | GapError::Execution(info)
            | GapError::Environment(info)
            | GapError::Io(info)
            | GapError::Serde(info) => info,
        }
    }

    /// Whether the error must abort the whole benchmark run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GapError::Execution(_))
    }

    /// Wraps an I/O failure on `path` under the given code.
    pub fn io(code: &str, path: &Path, err: std::io::Error) -> Self {
        GapError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
