use std::path::PathBuf;
use thiserror::Error;

use tradeboard_core::BuildError;
pub use tradeboard_core::ErrorKind;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template '{0}' is not registered")]
    TemplateNotFound(String),

    #[error("component '{0}' is not registered")]
    ComponentNotRegistered(String),

    #[error("grid component '{component}' needs a '{child}' template")]
    ChildTemplateNotFound { component: String, child: String },

    #[error("template '{template}' has no element marked '{attribute}'")]
    MissingAnchor {
        template: String,
        attribute: &'static str,
    },

    #[error("{component}: row {row} has {found} values for {expected} slots")]
    ArityMismatch {
        component: String,
        row: RowRef,
        expected: usize,
        found: usize,
    },

    #[error("{component}: slot name '{name}' is used twice")]
    DuplicateSlot { component: String, name: String },

    #[error("failed to read template library {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template library: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which row of a model failed to fit its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    Parent,
    Child(usize),
}

impl std::fmt::Display for RowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRef::Parent => write!(f, "parent"),
            RowRef::Child(index) => write!(f, "{index}"),
        }
    }
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::TemplateNotFound(_) | RenderError::ComponentNotRegistered(_) => {
                ErrorKind::Lookup
            }
            RenderError::ChildTemplateNotFound { .. }
            | RenderError::MissingAnchor { .. }
            | RenderError::Read { .. }
            | RenderError::Parse(_) => ErrorKind::Configuration,
            RenderError::ArityMismatch { .. } | RenderError::DuplicateSlot { .. } => {
                ErrorKind::Shape
            }
        }
    }
}

/// Failures of page assembly: building the view model or projecting it.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::Build(e) => e.kind(),
            PageError::Render(e) => e.kind(),
        }
    }
}
