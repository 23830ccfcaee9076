use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::operation::PathItem;
use super::revision::SpecRevision;
use super::security::{SecurityRequirement, SecuritySchemeOrRef};
use super::server::Server;

/// The `info` fields shown by `httpgen info` and in the rendered header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// An OpenAPI 3.x document, reduced to what request generation reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl OpenApiSpec {
    /// The declared revision. Documents are rejected at parse time unless
    /// this is `Some`.
    pub fn revision(&self) -> Option<SpecRevision> {
        SpecRevision::detect(&self.openapi)
    }

    /// Declared servers, or the single `/` server OpenAPI implies when the
    /// list is absent or empty.
    pub fn effective_servers(&self) -> Vec<Server> {
        if self.servers.is_empty() {
            vec![Server::new("/")]
        } else {
            self.servers.clone()
        }
    }

    /// The component security scheme table, empty when absent.
    pub fn security_schemes(&self) -> IndexMap<String, SecuritySchemeOrRef> {
        self.components
            .as_ref()
            .map(|c| c.security_schemes.clone())
            .unwrap_or_default()
    }

    /// Number of declared operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.operations().len()).sum()
    }
}
