// Copyright 2025 vessmorph developers
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared by every vessmorph entry point.

use std::path::PathBuf;

/// Result type for morphology operations
pub type MorphologyResult<T> = Result<T, MorphologyError>;

/// Errors raised while loading, building, processing or analysing a morphology.
///
/// Loaders surface [`Io`](MorphologyError::Io), [`Parse`](MorphologyError::Parse)
/// and [`Format`](MorphologyError::Format). The section builder surfaces
/// [`InvariantViolation`](MorphologyError::InvariantViolation). Analysis kernels
/// only surface [`Numeric`](MorphologyError::Numeric). Any operation that accepts
/// a [`TaskControl`](crate::TaskControl) may return
/// [`Cancelled`](MorphologyError::Cancelled).
///
/// # Examples
/// ```
/// use vessmorph_structures::MorphologyError;
///
/// let err = MorphologyError::parse(12, "expected 7 tokens, found 5");
/// assert_eq!(err.kind(), "parse");
/// assert_eq!(err.diagnostic(), "[parse] line 12: expected 7 tokens, found 5");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MorphologyError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}{}: {reason}", .column.map(|c| format!(", column {}", c)).unwrap_or_default())]
    Parse {
        line: usize,
        column: Option<usize>,
        reason: String,
    },

    #[error("{reason}")]
    Format { reason: String },

    #[error("{reason}")]
    InvariantViolation { reason: String },

    #[error("{reason}")]
    Numeric { reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl MorphologyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MorphologyError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        MorphologyError::Parse {
            line,
            column: None,
            reason: reason.into(),
        }
    }

    pub fn parse_at(line: usize, column: usize, reason: impl Into<String>) -> Self {
        MorphologyError::Parse {
            line,
            column: Some(column),
            reason: reason.into(),
        }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        MorphologyError::Format {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        MorphologyError::InvariantViolation {
            reason: reason.into(),
        }
    }

    pub fn numeric(reason: impl Into<String>) -> Self {
        MorphologyError::Numeric {
            reason: reason.into(),
        }
    }

    /// Stable short tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MorphologyError::Io { .. } => "io",
            MorphologyError::Parse { .. } => "parse",
            MorphologyError::Format { .. } => "format",
            MorphologyError::InvariantViolation { .. } => "invariant",
            MorphologyError::Numeric { .. } => "numeric",
            MorphologyError::Cancelled => "cancelled",
        }
    }

    /// Single-line diagnostic in the `[<kind>] <reason>` form.
    pub fn diagnostic(&self) -> String {
        format!("[{}] {}", self.kind(), self)
    }

    /// Process exit status a command-line host should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MorphologyError::Io { .. } => 2,
            MorphologyError::Parse { .. } => 3,
            MorphologyError::Format { .. } => 4,
            MorphologyError::InvariantViolation { .. } => 5,
            MorphologyError::Numeric { .. } => 6,
            MorphologyError::Cancelled => 130,
        }
    }
}
