//! Error and diagnostic types for the dashboard compiler.
//!
//! Hard failures (`CompileError`) are reserved for malformed input and I/O;
//! the best-effort policies of the resolver (skipped trait references,
//! unresolvable component libraries) surface as `Diagnostic`s collected on
//! the run instead of aborting compilation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("package has no `{0}` entry")]
    MissingPackageEntry(String),

    #[error("document at `{path}` is malformed: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("script action `{0}` could not be resolved from the package")]
    MissingScriptSource(String),

    #[error("failed to write `{path}`: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Warning-level conditions that do not change the emitted output but
/// should never pass unnoticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A declared trait reference pointed at a document that is not in the
    /// file map. The reference is skipped in the output.
    MissingTrait {
        referenced_from: String,
        trait_path: String,
    },
    /// No installed component library provides this component type. The
    /// import is still emitted, grouped under a sentinel package name.
    UnresolvedComponentLibrary { component_type: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTrait {
                referenced_from,
                trait_path,
            } => write!(
                f,
                "trait `{}` referenced from `{}` was not found and has been skipped",
                trait_path, referenced_from
            ),
            Self::UnresolvedComponentLibrary { component_type } => write!(
                f,
                "no component library provides `{}`",
                component_type
            ),
        }
    }
}
