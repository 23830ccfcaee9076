use serde::{Deserialize, Serialize};

/// A declared server. The URL is used verbatim; template variables are left
/// for the user to fill in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }

    /// A URL that carries no usable base: empty, whitespace, or the bare `/`
    /// OpenAPI substitutes when `servers` is omitted.
    pub fn is_trivial_url(url: &str) -> bool {
        let trimmed = url.trim();
        trimmed.is_empty() || trimmed == "/"
    }
}
