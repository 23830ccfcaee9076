use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;

use super::types::Diagnostic;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| format!("unknown method: {s}"))
    }
}

/// A request-scoped variable declared above the request line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HttpVariable {
    pub name: String,
    pub value: String,
    pub description: String,
}

impl HttpVariable {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    /// A variable with no value; clients prompt for it at send time.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, "", "")
    }

    pub fn is_prompt(&self) -> bool {
        self.value.is_empty()
    }
}

/// One request or response example for preview rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleEntry {
    /// Response status; `None` for request body examples.
    pub status: Option<String>,
    /// `None` for a response that declares no content at all.
    pub content_type: Option<String>,
    /// Name of the entry in an `examples` map.
    pub name: Option<String>,
    /// `None` when no value could be found or synthesized.
    pub value: Option<serde_json::Value>,
}

/// A fully resolved request for one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: HttpMethod,
    /// The templated path. The first line is the path proper; each further
    /// line is one query segment starting with `?` or `&`.
    pub path: String,
    pub headers: IndexMap<String, String>,
    pub params: Vec<HttpVariable>,
    pub body: Option<serde_json::Value>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub request_examples: Vec<ExampleEntry>,
    pub response_examples: Vec<ExampleEntry>,
    /// Client script run before the request is sent.
    pub pre_script: Option<String>,
    /// Client script run on the response.
    pub post_script: Option<String>,
    /// Non-fatal problems met while resolving this request.
    pub diagnostics: Vec<Diagnostic>,
}

impl Request {
    /// The path without its query segments.
    pub fn base_path(&self) -> &str {
        self.path.lines().next().unwrap_or_default()
    }

    /// The query segments, one per line, each led by `?` or `&`.
    pub fn query_segments(&self) -> impl Iterator<Item = &str> {
        self.path.lines().skip(1)
    }
}
