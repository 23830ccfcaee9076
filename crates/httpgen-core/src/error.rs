use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

/// Failure to synthesize a sample value from a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("cannot sample unresolved reference {0}")]
    UnresolvedRef(String),

    #[error("schema nesting exceeds depth {0}")]
    TooDeep(usize),

    #[error("cannot sample schema: {0}")]
    Unsupported(String),
}

/// Errors that abort the resolution of a single operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("parameter {name} not found in path {path}")]
    ParameterNotFound { name: String, path: String },

    #[error("request body declares {} content types ({}), only one is supported", .content_types.len(), .content_types.join(", "))]
    UnsupportedContentType { content_types: Vec<String> },
}

/// A constructed environment section or auth entry that breaks the
/// structural rules of the env file format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvValidationError {
    #[error("{field} is required for grant type {grant_type}")]
    MissingField {
        grant_type: &'static str,
        field: &'static str,
    },

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("variable key '{0}' must match ^[A-Za-z0-9_]+$")]
    InvalidVariableKey(String),

    #[error("variable '{0}' must be a string, number or object")]
    InvalidVariableValue(String),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}
