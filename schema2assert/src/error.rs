use thiserror::Error;

/// Failures raised while walking a schema document. The driver aborts on the
/// first error it sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
    #[error("target 'object' requires a class name")]
    MissingObjectName,
    #[error("object '{0}' not found in schema")]
    ObjectNotFound(String),
    #[error("schema document is not usable: {0}")]
    InvalidDocument(String),
    #[error("reference '{0}' does not resolve inside the document")]
    UnknownReference(String),
    #[error("unsupported schema shape at '{0}'")]
    UnsupportedShape(String),
}

/// Failures raised while rendering an intermediate model to source text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}
