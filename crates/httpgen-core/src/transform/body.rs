use indexmap::IndexMap;
use serde_json::Value;

use crate::error::RequestError;
use crate::ir::{Diagnostic, DiagnosticKind, ExampleEntry};
use crate::parse::media_type::MediaType;
use crate::parse::operation::Operation;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::ResponseOrRef;
use crate::sample::{SampleGenerator, SampleUsage};

/// A body value and the headers that go with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBody {
    pub content_type: String,
    pub body: Option<Value>,
    pub headers: IndexMap<String, String>,
}

impl ResolvedBody {
    fn new(content_type: &str, body: Option<Value>) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            content_type: content_type.to_string(),
            body,
            headers,
        }
    }
}

fn request_body(operation: &Operation) -> Option<&RequestBody> {
    match operation.request_body.as_ref()? {
        RequestBodyOrRef::RequestBody(body) => Some(body),
        RequestBodyOrRef::Ref { ref_path } => {
            log::debug!("skipping unresolved request body {ref_path}");
            None
        }
    }
}

/// One body per declared request content type.
pub fn resolve_request_body(
    operation: &Operation,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> IndexMap<String, ResolvedBody> {
    let Some(body) = request_body(operation) else {
        return IndexMap::new();
    };
    body.content
        .iter()
        .map(|(content_type, media)| {
            let subject = format!("request body {content_type}");
            let value = media_value(media, sampler, SampleUsage::Request, &subject, diagnostics);
            (content_type.clone(), ResolvedBody::new(content_type, value))
        })
        .collect()
}

/// The body sent with the request itself. More than one declared content
/// type is an error.
pub fn resolve_inline_body(
    operation: &Operation,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<ResolvedBody>, RequestError> {
    let Some(body) = request_body(operation) else {
        return Ok(None);
    };
    let (content_type, media) = match body.single_media() {
        Ok(Some(found)) => found,
        Ok(None) => return Ok(None),
        Err(content_types) => return Err(RequestError::UnsupportedContentType { content_types }),
    };
    let subject = format!("request body {content_type}");
    let value = media_value(media, sampler, SampleUsage::Request, &subject, diagnostics);
    Ok(Some(ResolvedBody::new(content_type, value)))
}

/// Status → content type → value. A status without content maps to an
/// empty table.
pub fn resolve_responses(
    operation: &Operation,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> IndexMap<String, IndexMap<String, Option<Value>>> {
    let mut out = IndexMap::new();
    for (status, response) in &operation.responses {
        let ResponseOrRef::Response(response) = response else {
            continue;
        };
        let bodies = response
            .content
            .iter()
            .map(|(content_type, media)| {
                let subject = format!("response {status} {content_type}");
                let value = media_value(media, sampler, SampleUsage::Response, &subject, diagnostics);
                (content_type.clone(), value)
            })
            .collect();
        out.insert(status.clone(), bodies);
    }
    out
}

/// Every request body example, across all content types.
pub fn request_examples(
    operation: &Operation,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ExampleEntry> {
    let Some(body) = request_body(operation) else {
        return Vec::new();
    };
    body.content
        .iter()
        .flat_map(|(content_type, media)| {
            media_examples(None, content_type, media, sampler, diagnostics)
        })
        .collect()
}

/// Every response example, across all statuses and content types. A status
/// without content yields one entry with neither content type nor value.
pub fn response_examples(
    operation: &Operation,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ExampleEntry> {
    let mut entries = Vec::new();
    for (status, response) in &operation.responses {
        let ResponseOrRef::Response(response) = response else {
            continue;
        };
        if response.content.is_empty() {
            entries.push(ExampleEntry {
                status: Some(status.clone()),
                content_type: None,
                name: None,
                value: None,
            });
            continue;
        }
        for (content_type, media) in &response.content {
            entries.extend(media_examples(
                Some(status),
                content_type,
                media,
                sampler,
                diagnostics,
            ));
        }
    }
    entries
}

fn media_examples(
    status: Option<&str>,
    content_type: &str,
    media: &MediaType,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ExampleEntry> {
    let entry = |name: Option<&str>, value: Option<Value>| ExampleEntry {
        status: status.map(str::to_string),
        content_type: Some(content_type.to_string()),
        name: name.map(str::to_string),
        value,
    };

    if let Some(example) = media.example.as_ref() {
        return vec![entry(None, Some(example.clone()))];
    }
    if !media.examples.is_empty() {
        return media
            .examples
            .iter()
            .map(|(name, ex)| entry(Some(name), ex.value().cloned()))
            .collect();
    }
    let (usage, subject) = match status {
        Some(status) => (SampleUsage::Response, format!("response {status} {content_type}")),
        None => (SampleUsage::Request, format!("request body {content_type}")),
    };
    vec![entry(None, sample(media, sampler, usage, &subject, diagnostics))]
}

/// Explicit example, then first named example, then a schema sample.
fn media_value(
    media: &MediaType,
    sampler: &dyn SampleGenerator,
    usage: SampleUsage,
    subject: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Value> {
    if let Some(example) = media.example.as_ref() {
        return Some(example.clone());
    }
    if let Some(value) = media.examples.values().next().and_then(|ex| ex.value()) {
        return Some(value.clone());
    }
    sample(media, sampler, usage, subject, diagnostics)
}

fn sample(
    media: &MediaType,
    sampler: &dyn SampleGenerator,
    usage: SampleUsage,
    subject: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Value> {
    let schema = media.schema.as_ref()?;
    match sampler.generate(schema, usage) {
        Ok(value) => Some(value),
        Err(e) => {
            diagnostics.push(Diagnostic::new(DiagnosticKind::SampleGeneration, subject, e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SchemaSampler;
    use serde_json::json;

    fn operation(yaml: &str) -> Operation {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_inline_body_with_example_and_header() {
        let op = operation(
            r#"
requestBody:
  content:
    application/json:
      example: {name: Rex}
      schema: {type: object, properties: {name: {type: string}}}
"#,
        );
        let mut diagnostics = Vec::new();
        let body = resolve_inline_body(&op, &SchemaSampler::new(), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert_eq!(body.body, Some(json!({"name": "Rex"})));
        assert_eq!(body.headers["Content-Type"], "application/json");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_multiple_content_types_rejected_inline_but_previewed() {
        let op = operation(
            r#"
requestBody:
  content:
    application/json:
      schema: {type: object, properties: {id: {type: integer}}}
    application/xml:
      schema: {type: object, properties: {id: {type: integer}}}
"#,
        );
        let sampler = SchemaSampler::new();
        let mut diagnostics = Vec::new();
        let err = resolve_inline_body(&op, &sampler, &mut diagnostics).unwrap_err();
        assert_eq!(
            err,
            RequestError::UnsupportedContentType {
                content_types: vec!["application/json".into(), "application/xml".into()],
            }
        );
        assert_eq!(resolve_request_body(&op, &sampler, &mut diagnostics).len(), 2);
        assert_eq!(request_examples(&op, &sampler, &mut diagnostics).len(), 2);
    }

    #[test]
    fn test_responses_keep_statuses_without_content() {
        let op = operation(
            r#"
responses:
  "200":
    description: ok
    content:
      application/json:
        schema:
          type: object
          properties:
            items: {type: array, items: {type: string}}
  "204":
    description: empty
"#,
        );
        let sampler = SchemaSampler::new();
        let mut diagnostics = Vec::new();
        let responses = resolve_responses(&op, &sampler, &mut diagnostics);
        let body = responses["200"]["application/json"].as_ref().unwrap();
        assert!(body["items"].is_array());
        assert!(responses["204"].is_empty());

        let entries = response_examples(&op, &sampler, &mut diagnostics);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].status.as_deref(), Some("204"));
        assert_eq!(entries[1].content_type, None);
        assert_eq!(entries[1].value, None);
    }

    #[test]
    fn test_read_only_fields_only_in_responses() {
        let op = operation(
            r#"
requestBody:
  content:
    application/json:
      schema:
        type: object
        properties:
          id: {type: integer, readOnly: true}
          name: {type: string}
responses:
  "201":
    description: created
    content:
      application/json:
        schema:
          type: object
          properties:
            id: {type: integer, readOnly: true}
            name: {type: string}
"#,
        );
        let sampler = SchemaSampler::new();
        let mut diagnostics = Vec::new();
        let body = resolve_inline_body(&op, &sampler, &mut diagnostics)
            .unwrap()
            .unwrap();
        assert_eq!(body.body, Some(json!({"name": "string"})));
        let responses = resolve_responses(&op, &sampler, &mut diagnostics);
        assert_eq!(
            responses["201"]["application/json"],
            Some(json!({"id": 0, "name": "string"}))
        );
    }

    #[test]
    fn test_named_examples_each_yield_an_entry() {
        let op = operation(
            r#"
responses:
  "200":
    description: ok
    content:
      application/json:
        examples:
          cat: {value: {kind: cat}}
          dog: {value: {kind: dog}}
"#,
        );
        let mut diagnostics = Vec::new();
        let entries = response_examples(&op, &SchemaSampler::new(), &mut diagnostics);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_deref()).collect();
        assert_eq!(names, vec![Some("cat"), Some("dog")]);
        assert_eq!(entries[1].value, Some(json!({"kind": "dog"})));
    }

    #[test]
    fn test_failed_sample_yields_null_entry() {
        let op = operation(
            r##"
responses:
  "200":
    description: ok
    content:
      application/json:
        schema: {$ref: "#/components/schemas/Missing"}
"##,
        );
        let mut diagnostics = Vec::new();
        let entries = response_examples(&op, &SchemaSampler::new(), &mut diagnostics);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, None);
        assert_eq!(diagnostics.len(), 1);
    }
}
