use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::RequestError;
use crate::ir::{Diagnostic, DiagnosticKind, HttpVariable};
use crate::parse::parameter::ParameterLocation;
use crate::parse::revision::ParameterView;
use crate::sample::{SampleGenerator, SampleUsage};

use super::naming::placeholder;

/// Characters left as-is in query names: alphanumerics and `_ . - ~`.
const QUERY_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// The request pieces parameters (and later security) contribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    pub path: String,
    pub variables: Vec<HttpVariable>,
    pub headers: IndexMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedParameters {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Appends `?name={{var}}`, or `&name={{var}}` once a query exists.
    pub fn push_query(&mut self, name: &str, var: &str) {
        let lead = if self.path.contains('?') { '&' } else { '?' };
        let encoded = utf8_percent_encode(name, QUERY_NAME);
        self.path
            .push_str(&format!("\n{lead}{encoded}={}", placeholder(var)));
    }

    /// Adds `name={{var}}` to the single `Cookie` header.
    pub fn push_cookie(&mut self, name: &str, var: &str) {
        let pair = format!("{name}={}", placeholder(var));
        match self.headers.get_mut("Cookie") {
            Some(existing) if !existing.is_empty() => {
                existing.push_str("; ");
                existing.push_str(&pair);
            }
            _ => {
                self.headers.insert("Cookie".to_string(), pair);
            }
        }
    }
}

/// Rewrites `path` for the declared parameters and collects one variable per
/// parameter, plus one empty variable per path token nobody declared.
///
/// Declared path tokens become `{{name}}`; undeclared ones stay `{name}`.
pub fn resolve_parameters<P: ParameterView>(
    path: &str,
    params: &[P],
    sampler: &dyn SampleGenerator,
) -> Result<ResolvedParameters, RequestError> {
    let mut resolved = ResolvedParameters::new(path);

    for param in params {
        let name = param.name();
        match param.location() {
            ParameterLocation::Path => {
                resolved.path = substitute_path_token(&resolved.path, name).ok_or_else(|| {
                    RequestError::ParameterNotFound {
                        name: name.to_string(),
                        path: path.to_string(),
                    }
                })?;
            }
            ParameterLocation::Query => resolved.push_query(name, name),
            ParameterLocation::Header => {
                resolved
                    .headers
                    .insert(name.to_string(), placeholder(name));
            }
            ParameterLocation::Cookie => resolved.push_cookie(name, name),
        }

        let value = parameter_value(param, sampler, &mut resolved.diagnostics);
        resolved.variables.push(HttpVariable::new(
            name,
            value,
            param.description().unwrap_or_default(),
        ));
    }

    let declared: Vec<&str> = params
        .iter()
        .filter(|p| p.location() == ParameterLocation::Path)
        .map(|p| p.name())
        .collect();
    let base = resolved.path.lines().next().unwrap_or_default();
    for token in undeclared_tokens(base) {
        if !declared.contains(&token) {
            log::debug!("undeclared path parameter {token} in {path}");
            resolved.variables.push(HttpVariable::placeholder(token));
        }
    }

    Ok(resolved)
}

/// Explicit example, then first named example, then a schema sample, then
/// nothing.
fn parameter_value<P: ParameterView>(
    param: &P,
    sampler: &dyn SampleGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    if let Some(value) = param.example().or_else(|| param.first_named_example()) {
        return value_text(value);
    }
    let Some(schema) = param.schema() else {
        return String::new();
    };
    match sampler.generate(schema, SampleUsage::Request) {
        Ok(value) => value_text(&value),
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::SampleGeneration,
                format!("parameter {}", param.name()),
                e,
            ));
            String::new()
        }
    }
}

/// Plain text for a variable line: strings unquoted, everything else as JSON.
pub fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every single-brace `{name}` in the first line of `path`.
/// Returns `None` when the token is absent. A token already rewritten by an
/// earlier declaration of the same name counts as present.
fn substitute_path_token(path: &str, name: &str) -> Option<String> {
    let (base, rest) = match path.find('\n') {
        Some(i) => path.split_at(i),
        None => (path, ""),
    };
    let token = format!("{{{name}}}");
    let spans = single_brace_spans(base, &token);
    if spans.is_empty() {
        return base.contains(&placeholder(name)).then(|| path.to_string());
    }

    let mut out = String::with_capacity(path.len() + spans.len() * 2);
    let mut last = 0;
    for start in spans {
        out.push_str(&base[last..start]);
        out.push_str(&placeholder(name));
        last = start + token.len();
    }
    out.push_str(&base[last..]);
    out.push_str(rest);
    Some(out)
}

/// Start offsets of `token` not directly wrapped in another brace pair.
fn single_brace_spans(haystack: &str, token: &str) -> Vec<usize> {
    haystack
        .match_indices(token)
        .map(|(i, _)| i)
        .filter(|&i| {
            let before = haystack[..i].ends_with('{');
            let after = haystack[i + token.len()..].starts_with('}');
            !before && !after
        })
        .collect()
}

/// Names of `{name}` tokens not wrapped in another brace pair, in order and
/// without repeats.
fn undeclared_tokens(path: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut rest = path;
    let mut offset = 0;
    while let Some(open) = rest.find('{') {
        let start = offset + open;
        let Some(len) = path[start + 1..].find('}') else {
            break;
        };
        let end = start + 1 + len;
        let name = &path[start + 1..end];
        let wrapped = path[..start].ends_with('{') || path[end + 1..].starts_with('}');
        if !wrapped && !name.is_empty() && !name.contains('{') && !names.contains(&name) {
            names.push(name);
        }
        offset = end + 1;
        rest = &path[offset..];
    }
    names
}
