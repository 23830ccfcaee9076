use std::collections::HashSet;

use indexmap::IndexMap;

use super::components::Components;
use super::example::{Example, ExampleOrRef};
use super::media_type::MediaType;
use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{AdditionalProperties, Schema, SchemaOrRef};
use super::security::{SecurityScheme, SecuritySchemeOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Resolves `$ref` pointers into `#/components`, producing a spec in which
/// operations only hold inline parameters, bodies, responses and examples.
///
/// Circular schema references are left in place as `$ref` nodes; the sample
/// generator reports them when it reaches one. Security scheme references
/// that cannot be followed are also left in place so the security and
/// environment stages can skip them individually.
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
    visited: HashSet<String>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
            visited: HashSet::new(),
        }
    }

    pub fn resolve_spec(&mut self, spec: &OpenApiSpec) -> Result<OpenApiSpec, ResolveError> {
        let mut resolved = spec.clone();

        for item in resolved.paths.values_mut() {
            self.resolve_path_item(item)?;
        }

        if let Some(ref mut components) = resolved.components {
            let schemes = std::mem::take(&mut components.security_schemes);
            components.security_schemes = schemes
                .into_iter()
                .map(|(name, scheme)| {
                    let scheme = self.resolve_security_scheme(&name, scheme);
                    (name, scheme)
                })
                .collect();
        }

        Ok(resolved)
    }

    fn resolve_path_item(&mut self, item: &mut PathItem) -> Result<(), ResolveError> {
        item.parameters = self.resolve_parameters(&item.parameters)?;

        for op in [
            &mut item.get,
            &mut item.put,
            &mut item.post,
            &mut item.delete,
            &mut item.options,
            &mut item.head,
            &mut item.patch,
            &mut item.trace,
        ]
        .into_iter()
        .flatten()
        {
            self.resolve_operation(op)?;
        }
        Ok(())
    }

    fn resolve_operation(&mut self, op: &mut Operation) -> Result<(), ResolveError> {
        op.parameters = self.resolve_parameters(&op.parameters)?;

        if let Some(ref body) = op.request_body {
            op.request_body = Some(self.resolve_request_body_or_ref(body)?);
        }

        let mut responses = IndexMap::new();
        for (status, resp) in &op.responses {
            responses.insert(status.clone(), self.resolve_response_or_ref(resp)?);
        }
        op.responses = responses;

        Ok(())
    }

    fn resolve_parameters(
        &mut self,
        params: &[ParameterOrRef],
    ) -> Result<Vec<ParameterOrRef>, ResolveError> {
        params
            .iter()
            .map(|p| self.resolve_parameter_or_ref(p))
            .collect()
    }

    pub fn resolve_schema_or_ref(
        &mut self,
        schema_or_ref: &SchemaOrRef,
    ) -> Result<SchemaOrRef, ResolveError> {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => {
                if self.visited.contains(ref_path) {
                    // Cycle: leave the reference for the sampler to report.
                    return Ok(schema_or_ref.clone());
                }
                self.visited.insert(ref_path.clone());
                let target = self.lookup_schema(ref_path);
                let result = match target {
                    Ok(schema) => self.resolve_schema_or_ref(&SchemaOrRef::Schema(Box::new(schema))),
                    Err(e) => Err(e),
                };
                self.visited.remove(ref_path);
                result
            }
            SchemaOrRef::Schema(schema) => {
                let resolved = self.resolve_schema(schema)?;
                Ok(SchemaOrRef::Schema(Box::new(resolved)))
            }
        }
    }

    fn resolve_schema(&mut self, schema: &Schema) -> Result<Schema, ResolveError> {
        let mut resolved = schema.clone();

        let mut props = IndexMap::new();
        for (name, prop) in &schema.properties {
            props.insert(name.clone(), self.resolve_schema_or_ref(prop)?);
        }
        resolved.properties = props;

        if let Some(ref items) = schema.items {
            resolved.items = Some(Box::new(self.resolve_schema_or_ref(items)?));
        }

        resolved.all_of = self.resolve_schema_list(&schema.all_of)?;
        resolved.one_of = self.resolve_schema_list(&schema.one_of)?;
        resolved.any_of = self.resolve_schema_list(&schema.any_of)?;

        if let Some(AdditionalProperties::Schema(ref s)) = schema.additional_properties {
            resolved.additional_properties = Some(AdditionalProperties::Schema(Box::new(
                self.resolve_schema_or_ref(s)?,
            )));
        }

        Ok(resolved)
    }

    fn resolve_schema_list(
        &mut self,
        list: &[SchemaOrRef],
    ) -> Result<Vec<SchemaOrRef>, ResolveError> {
        list.iter().map(|s| self.resolve_schema_or_ref(s)).collect()
    }

    fn resolve_parameter_or_ref(
        &mut self,
        param: &ParameterOrRef,
    ) -> Result<ParameterOrRef, ResolveError> {
        let mut resolved = match param {
            ParameterOrRef::Ref { ref_path } => self.lookup_parameter(ref_path)?,
            ParameterOrRef::Parameter(p) => p.clone(),
        };
        if let Some(ref s) = resolved.schema {
            resolved.schema = Some(self.resolve_schema_or_ref(s)?);
        }
        resolved.examples = self.resolve_examples(&resolved.examples);
        Ok(ParameterOrRef::Parameter(resolved))
    }

    fn resolve_request_body_or_ref(
        &mut self,
        body: &RequestBodyOrRef,
    ) -> Result<RequestBodyOrRef, ResolveError> {
        let mut rb = match body {
            RequestBodyOrRef::Ref { ref_path } => self.lookup_request_body(ref_path)?,
            RequestBodyOrRef::RequestBody(rb) => rb.clone(),
        };
        self.resolve_media_types(&mut rb.content)?;
        Ok(RequestBodyOrRef::RequestBody(rb))
    }

    fn resolve_response_or_ref(
        &mut self,
        resp: &ResponseOrRef,
    ) -> Result<ResponseOrRef, ResolveError> {
        let mut r = match resp {
            ResponseOrRef::Ref { ref_path } => self.lookup_response(ref_path)?,
            ResponseOrRef::Response(r) => r.clone(),
        };
        self.resolve_media_types(&mut r.content)?;
        Ok(ResponseOrRef::Response(r))
    }

    fn resolve_media_types(
        &mut self,
        content: &mut IndexMap<String, MediaType>,
    ) -> Result<(), ResolveError> {
        for mt in content.values_mut() {
            if let Some(ref s) = mt.schema {
                mt.schema = Some(self.resolve_schema_or_ref(s)?);
            }
            mt.examples = self.resolve_examples(&mt.examples);
        }
        Ok(())
    }

    /// Example references that cannot be followed are kept; they simply
    /// carry no value.
    fn resolve_examples(
        &self,
        examples: &IndexMap<String, ExampleOrRef>,
    ) -> IndexMap<String, ExampleOrRef> {
        examples
            .iter()
            .map(|(name, ex)| {
                let resolved = match ex {
                    ExampleOrRef::Ref { ref_path } => match self.lookup_example(ref_path) {
                        Ok(example) => ExampleOrRef::Example(example),
                        Err(e) => {
                            log::debug!("leaving example {name} unresolved: {e}");
                            ex.clone()
                        }
                    },
                    ExampleOrRef::Example(_) => ex.clone(),
                };
                (name.clone(), resolved)
            })
            .collect()
    }

    fn resolve_security_scheme(
        &self,
        name: &str,
        scheme: SecuritySchemeOrRef,
    ) -> SecuritySchemeOrRef {
        match scheme {
            SecuritySchemeOrRef::Ref { ref_path } => match self.lookup_security_scheme(&ref_path) {
                Ok(resolved) => SecuritySchemeOrRef::Scheme(resolved),
                Err(e) => {
                    log::warn!("security scheme {name} left unresolved: {e}");
                    SecuritySchemeOrRef::Ref { ref_path }
                }
            },
            inline => inline,
        }
    }

    // Lookup helpers

    fn lookup_schema(&self, ref_path: &str) -> Result<Schema, ResolveError> {
        let name = parse_ref_name(ref_path, "schemas")?;
        let mut current = self.components.and_then(|c| c.schemas.get(name));
        // Follow alias chains (`A: {$ref: B}`) a bounded number of times.
        for _ in 0..8 {
            match current {
                Some(SchemaOrRef::Schema(schema)) => return Ok(schema.as_ref().clone()),
                Some(SchemaOrRef::Ref { ref_path: inner }) => {
                    let inner_name = parse_ref_name(inner, "schemas")?;
                    current = self.components.and_then(|c| c.schemas.get(inner_name));
                }
                None => break,
            }
        }
        Err(ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_parameter(&self, ref_path: &str) -> Result<Parameter, ResolveError> {
        let name = parse_ref_name(ref_path, "parameters")?;
        self.components
            .and_then(|c| c.parameters.get(name))
            .and_then(|p| match p {
                ParameterOrRef::Parameter(param) => Some(param.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_request_body(&self, ref_path: &str) -> Result<RequestBody, ResolveError> {
        let name = parse_ref_name(ref_path, "requestBodies")?;
        self.components
            .and_then(|c| c.request_bodies.get(name))
            .and_then(|rb| match rb {
                RequestBodyOrRef::RequestBody(body) => Some(body.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_response(&self, ref_path: &str) -> Result<Response, ResolveError> {
        let name = parse_ref_name(ref_path, "responses")?;
        self.components
            .and_then(|c| c.responses.get(name))
            .and_then(|r| match r {
                ResponseOrRef::Response(resp) => Some(resp.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_example(&self, ref_path: &str) -> Result<Example, ResolveError> {
        let name = parse_ref_name(ref_path, "examples")?;
        self.components
            .and_then(|c| c.examples.get(name))
            .and_then(|e| match e {
                ExampleOrRef::Example(example) => Some(example.clone()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    fn lookup_security_scheme(&self, ref_path: &str) -> Result<SecurityScheme, ResolveError> {
        let name = parse_ref_name(ref_path, "securitySchemes")?;
        self.components
            .and_then(|c| c.security_schemes.get(name))
            .and_then(|s| s.as_scheme().cloned())
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
fn parse_ref_name<'a>(ref_path: &'a str, expected_section: &str) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
