use thiserror::Error;

use crate::path::FieldPath;

/// Boxed error type carried by field compute thunks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ProjectError {
    /// A dotted path token was malformed (empty string or empty segment).
    ///
    /// Recoverable at the parse boundary: callers drop the token and keep
    /// the rest of the list.
    #[error("invalid field path: {0:?}")]
    InvalidFieldPath(String),

    /// The `response` parameter named a profile this deployment does not know.
    ///
    /// Callers fall back to the `default` profile rather than failing the
    /// request.
    #[error("unknown response profile: {0:?}")]
    UnknownResponseProfile(String),

    /// A field's compute thunk failed.
    ///
    /// Fatal for a single-item projection; collection callers skip the
    /// entity and continue.
    #[error("field computation failed for `{path}`")]
    FieldComputation {
        path: FieldPath,
        #[source]
        source: BoxError,
    },

    /// The schema declares a field no thunk was registered for.
    ///
    /// This is a wiring bug in the caller, not a data problem.
    #[error("no computer wired for field `{0}`")]
    UnwiredField(FieldPath),
}

/// Errors from loading a response-profile defaults file.
#[derive(Debug, Error)]
pub enum ProfileFileError {
    #[error("failed to read profiles file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profiles file")]
    Parse(#[from] serde_yaml::Error),
    #[error("unknown profile name in profiles file: {0:?}")]
    UnknownProfile(String),
    #[error("invalid field path {path:?} in profile {profile:?}")]
    InvalidPath { profile: String, path: String },
}
