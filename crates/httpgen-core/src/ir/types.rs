use std::fmt;

use serde::Serialize;

use super::environment::EnvironmentBuild;
use super::request::{HttpMethod, Request};
use crate::error::RequestError;

/// Everything produced from one document, ready for a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct HttpFileSpec {
    pub info: DocumentInfo,
    /// Non-trivial base URLs, deduplicated and sorted.
    pub base_urls: Vec<BaseUrl>,
    pub requests: Vec<Request>,
    pub failures: Vec<OperationFailure>,
    pub environments: EnvironmentBuild,
}

impl HttpFileSpec {
    /// Every diagnostic raised while building requests and environments.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.requests
            .iter()
            .flat_map(|r| r.diagnostics.iter())
            .chain(self.environments.diagnostics.iter())
    }
}

/// API metadata.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    pub openapi: String,
}

/// A candidate value for the `BASE_URL` variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BaseUrl {
    pub value: String,
    pub description: String,
}

/// An operation that could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationFailure {
    pub method: HttpMethod,
    pub path: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: RequestError,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.path, self.error)
    }
}

/// What kind of non-fatal problem a [`Diagnostic`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    SampleGeneration,
    SecuritySchemeUnresolvable,
    EnvironmentSectionValidation,
    OAuth2FlowSkipped,
}

/// A skipped or degraded item, kept so skips stay auditable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// What was affected, e.g. `parameter limit` or `scheme ApiKeyAuth`.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl fmt::Display) -> Self {
        let diagnostic = Self {
            kind,
            subject: subject.into(),
            message: message.to_string(),
        };
        log::warn!("{diagnostic}");
        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
