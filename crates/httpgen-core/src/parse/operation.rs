use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ir::HttpMethod;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::security::SecurityRequirement;

/// An API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// `None` inherits the document requirement; `Some(vec![])` disables
    /// security for this operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    /// Script run by the HTTP client before sending the request.
    #[serde(rename = "x-pre-request-script", skip_serializing_if = "Option::is_none")]
    pub pre_request_script: Option<Value>,

    /// Response handler script.
    #[serde(rename = "x-post-request-script", skip_serializing_if = "Option::is_none")]
    pub post_request_script: Option<Value>,
}

impl Operation {
    /// The pre-request script, if the extension holds a string.
    pub fn pre_script(&self) -> Option<&str> {
        self.pre_request_script.as_ref().and_then(Value::as_str)
    }

    /// The response handler script, if the extension holds a string.
    pub fn post_script(&self) -> Option<&str> {
        self.post_request_script.as_ref().and_then(Value::as_str)
    }

    /// Inline parameters declared on the operation. References are expected
    /// to have been resolved already and are skipped.
    pub fn inline_parameters(&self) -> impl Iterator<Item = &Parameter> {
        inline(&self.parameters)
    }
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Declared operations in emission order.
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect()
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations()
            .into_iter()
            .find(|(m, _)| *m == method)
            .map(|(_, op)| op)
    }

    /// Path-level parameters followed by the operation's own, without
    /// deduplication.
    pub fn parameters_for<'a>(&'a self, op: &'a Operation) -> Vec<&'a Parameter> {
        inline(&self.parameters).chain(op.inline_parameters()).collect()
    }
}

fn inline(params: &[ParameterOrRef]) -> impl Iterator<Item = &Parameter> {
    params.iter().filter_map(|p| match p {
        ParameterOrRef::Parameter(param) => Some(param),
        ParameterOrRef::Ref { .. } => None,
    })
}
