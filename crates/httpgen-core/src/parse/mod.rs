pub mod components;
pub mod example;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod revision;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use revision::SpecRevision;
use spec::OpenApiSpec;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse a spec whose format is unknown: JSON first, then YAML.
pub fn from_str(input: &str) -> Result<OpenApiSpec, ParseError> {
    match serde_json::from_str::<OpenApiSpec>(input) {
        Ok(spec) => {
            validate_version(&spec)?;
            Ok(spec)
        }
        Err(json_err) => {
            log::debug!("not JSON ({json_err}), trying YAML");
            from_yaml(input)
        }
    }
}

/// Parse by file extension, falling back to content sniffing.
pub fn from_path_str(extension: Option<&str>, input: &str) -> Result<OpenApiSpec, ParseError> {
    match extension {
        Some("json") => from_json(input),
        Some("yaml" | "yml") => from_yaml(input),
        _ => from_str(input),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<SpecRevision, ParseError> {
    SpecRevision::detect(&spec.openapi)
        .ok_or_else(|| ParseError::UnsupportedVersion(spec.openapi.clone()))
}
