//! Error taxonomy shared by the view-model and rendering layers.
//!
//! Every error the core raises falls into one of three kinds. None of them
//! are retried: they signal a data-integrity or configuration fault and
//! propagate to whoever invoked the failing operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::DayId;

/// Coarse classification of a core error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Something named (a day, a template, a field) does not exist.
    Lookup,
    /// Input data has the wrong arity or structure.
    Shape,
    /// A component is wired up inconsistently (e.g. grid without a child template).
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Lookup => "lookup",
            ErrorKind::Shape => "shape",
            ErrorKind::Configuration => "configuration",
        };
        write!(f, "{label}")
    }
}

/// Errors from parsing raw day records and shaping view models.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("trading day '{day}' is not in the day index")]
    DayNotFound { day: DayId },

    #[error("{record} record {index} has {found} columns, expected at least {expected}")]
    Shape {
        record: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("{record} record {index}: {reason}")]
    Malformed {
        record: &'static str,
        index: usize,
        reason: String,
    },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::DayNotFound { .. } => ErrorKind::Lookup,
            BuildError::Shape { .. } | BuildError::Malformed { .. } => ErrorKind::Shape,
        }
    }

    pub(crate) fn shape(record: &'static str, index: usize, expected: usize, found: usize) -> Self {
        BuildError::Shape {
            record,
            index,
            expected,
            found,
        }
    }

    pub(crate) fn malformed(record: &'static str, index: usize, reason: impl Into<String>) -> Self {
        BuildError::Malformed {
            record,
            index,
            reason: reason.into(),
        }
    }
}
