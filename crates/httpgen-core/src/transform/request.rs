use indexmap::IndexMap;

use crate::error::RequestError;
use crate::ir::{Diagnostic, HttpMethod, Request};
use crate::parse::operation::Operation;
use crate::parse::revision::ParameterView;
use crate::parse::security::{SecurityRequirement, SecuritySchemeOrRef};
use crate::sample::SampleGenerator;

use super::body::{request_examples, resolve_inline_body, response_examples};
use super::params::resolve_parameters;
use super::security::SecurityResolver;

/// Turns one operation into a [`Request`].
pub struct RequestAssembler<'a> {
    sampler: &'a dyn SampleGenerator,
    security: SecurityResolver<'a>,
}

impl<'a> RequestAssembler<'a> {
    pub fn new(
        sampler: &'a dyn SampleGenerator,
        schemes: &'a IndexMap<String, SecuritySchemeOrRef>,
        root_security: Option<&'a [SecurityRequirement]>,
    ) -> Self {
        Self {
            sampler,
            security: SecurityResolver::new(schemes, root_security),
        }
    }

    /// Body, then parameters, then security, then preview examples.
    ///
    /// A missing path token or an ambiguous request body fails the whole
    /// operation; sampling problems only null out the affected value.
    pub fn from_operation<P: ParameterView>(
        &self,
        method: HttpMethod,
        path: &str,
        parameters: &[P],
        operation: &Operation,
    ) -> Result<Request, RequestError> {
        let mut diagnostics = Vec::new();
        let body = resolve_inline_body(operation, self.sampler, &mut diagnostics)?;

        let resolved = resolve_parameters(path, parameters, self.sampler)?;
        let resolved = self.security.apply(operation, resolved);
        merge(&mut diagnostics, resolved.diagnostics);

        let mut headers = IndexMap::new();
        let body = body.map(|b| {
            headers.extend(b.headers);
            b.body
        });
        headers.extend(resolved.headers);

        let mut example_diagnostics = Vec::new();
        let request_examples = request_examples(operation, self.sampler, &mut example_diagnostics);
        let response_examples = response_examples(operation, self.sampler, &mut example_diagnostics);
        merge(&mut diagnostics, example_diagnostics);

        log::debug!(
            "{method} {path}: {} variables, {} headers",
            resolved.variables.len(),
            headers.len()
        );

        Ok(Request {
            method,
            path: resolved.path,
            headers,
            params: resolved.variables,
            body: body.flatten(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            request_examples,
            response_examples,
            pre_script: operation.pre_script().map(str::to_string),
            post_script: operation.post_script().map(str::to_string),
            diagnostics,
        })
    }
}

fn merge(into: &mut Vec<Diagnostic>, from: Vec<Diagnostic>) {
    for diagnostic in from {
        if !into.contains(&diagnostic) {
            into.push(diagnostic);
        }
    }
}
