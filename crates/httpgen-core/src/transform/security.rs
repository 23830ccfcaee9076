use indexmap::IndexMap;

use crate::ir::{Diagnostic, DiagnosticKind};
use crate::parse::operation::Operation;
use crate::parse::security::{
    ApiKeyLocation, SecurityRequirement, SecurityScheme, SecuritySchemeOrRef, SecuritySchemeType,
};

use super::naming::{placeholder, scheme_alias};
use super::params::ResolvedParameters;
use super::policy::{SecuritySelector, effective_requirement, first_alternative};

/// Default parameter name for an API key scheme that declares none.
pub const DEFAULT_API_KEY_NAME: &str = "api_key";

/// Applies an operation's security requirement to its headers and path.
pub struct SecurityResolver<'a> {
    schemes: &'a IndexMap<String, SecuritySchemeOrRef>,
    root: Option<&'a [SecurityRequirement]>,
    select: SecuritySelector,
}

impl<'a> SecurityResolver<'a> {
    pub fn new(
        schemes: &'a IndexMap<String, SecuritySchemeOrRef>,
        root: Option<&'a [SecurityRequirement]>,
    ) -> Self {
        Self {
            schemes,
            root,
            select: first_alternative,
        }
    }

    pub fn with_selector(mut self, select: SecuritySelector) -> Self {
        self.select = select;
        self
    }

    /// Applies every scheme of the selected alternative. Schemes that are
    /// missing or cannot be expressed are skipped with a diagnostic.
    pub fn apply(&self, operation: &Operation, mut resolved: ResolvedParameters) -> ResolvedParameters {
        let requirement = effective_requirement(operation, self.root);
        let Some(alternative) = (self.select)(requirement) else {
            return resolved;
        };

        for scheme_name in alternative.keys() {
            match self.schemes.get(scheme_name).and_then(SecuritySchemeOrRef::as_scheme) {
                Some(scheme) => {
                    if let Err(reason) = apply_scheme(scheme_name, scheme, &mut resolved) {
                        resolved.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::SecuritySchemeUnresolvable,
                            format!("scheme {scheme_name}"),
                            reason,
                        ));
                    }
                }
                None => resolved.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SecuritySchemeUnresolvable,
                    format!("scheme {scheme_name}"),
                    "not declared in components.securitySchemes",
                )),
            }
        }
        resolved
    }
}

fn apply_scheme(
    scheme_name: &str,
    scheme: &SecurityScheme,
    resolved: &mut ResolvedParameters,
) -> Result<(), String> {
    let alias = scheme_alias(scheme_name);
    match scheme.scheme_type {
        SecuritySchemeType::Http => {
            let value = match scheme.http_scheme().as_str() {
                "basic" => credentials_header("Basic", &alias),
                "digest" => credentials_header("Digest", &alias),
                "bearer" => format!("Bearer {}", placeholder(&format!("{alias}_TOKEN"))),
                "ntlm" => "NTLM".to_string(),
                "negotiate" => "Negotiate".to_string(),
                other => return Err(format!("unsupported http scheme '{other}'")),
            };
            resolved.headers.insert("Authorization".to_string(), value);
        }
        SecuritySchemeType::ApiKey => {
            let name = scheme.name.as_deref().unwrap_or(DEFAULT_API_KEY_NAME);
            match scheme.location.unwrap_or(ApiKeyLocation::Header) {
                ApiKeyLocation::Header => {
                    resolved.headers.insert(name.to_string(), placeholder(&alias));
                }
                ApiKeyLocation::Query => resolved.push_query(name, &alias),
                ApiKeyLocation::Cookie => resolved.push_cookie(name, &alias),
            }
        }
        SecuritySchemeType::OAuth2 | SecuritySchemeType::OpenIdConnect => {
            resolved.headers.insert(
                "Authorization".to_string(),
                format!("Bearer {{{{$auth.token(\"{scheme_name}\")}}}}"),
            );
        }
        SecuritySchemeType::MutualTls => {}
        SecuritySchemeType::Unsupported => return Err("unsupported scheme type".to_string()),
    }
    Ok(())
}

fn credentials_header(kind: &str, alias: &str) -> String {
    format!(
        "{kind} {}:{}",
        placeholder(&format!("{alias}_USERNAME")),
        placeholder(&format!("{alias}_PASSWORD"))
    )
}
