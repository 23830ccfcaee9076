//! Public and private env files from servers and security schemes.
//!
//! Only the private tree ever receives secret placeholders (passwords,
//! client secrets, tokens, API keys). Both trees carry the same section
//! names; only the public one carries `BASE_URL` and OAuth2 settings.

use indexmap::IndexMap;
use serde_json::Value;

use crate::ir::{
    Diagnostic, DiagnosticKind, EnvSection, EnvTree, EnvironmentBuild, GrantType, PLACEHOLDER,
    PRIVATE_ENV_SCHEMA_URL, PUBLIC_ENV_SCHEMA_URL, PrivateAuth, PublicOAuth2Auth, Security,
};
use crate::parse::security::{OAuthFlow, SecurityScheme, SecuritySchemeOrRef, SecuritySchemeType};
use crate::parse::server::Server;

use super::naming::{scheme_alias, section_name};
use super::policy::{FlowSelector, preferred_flow};

/// Default base name for environment sections.
pub const DEFAULT_ENV_NAME: &str = "dev";

/// Builds [`EnvironmentBuild`]s.
pub struct EnvironmentBuilder<'a> {
    env_name: &'a str,
    select_flow: FlowSelector,
}

/// What the security schemes contribute to every section.
#[derive(Default)]
struct Contributions {
    public_auth: IndexMap<String, PublicOAuth2Auth>,
    private_auth: IndexMap<String, PrivateAuth>,
    private_vars: IndexMap<String, Value>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for EnvironmentBuilder<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_NAME)
    }
}

impl<'a> EnvironmentBuilder<'a> {
    pub fn new(env_name: &'a str) -> Self {
        Self {
            env_name,
            select_flow: preferred_flow,
        }
    }

    pub fn with_flow_selector(mut self, select_flow: FlowSelector) -> Self {
        self.select_flow = select_flow;
        self
    }

    /// One section per server in document order, then one for
    /// `override_base_url`. No servers means a single `/` server.
    pub fn build(
        &self,
        servers: &[Server],
        schemes: &IndexMap<String, SecuritySchemeOrRef>,
        override_base_url: Option<&str>,
    ) -> EnvironmentBuild {
        let mut urls: Vec<&str> = if servers.is_empty() {
            vec!["/"]
        } else {
            servers.iter().map(|s| s.url.as_str()).collect()
        };
        urls.extend(override_base_url);
        let found_valid_base_url = urls.iter().any(|url| !Server::is_trivial_url(url));

        let contributions = self.contributions(schemes);

        let mut public = EnvTree::new(PUBLIC_ENV_SCHEMA_URL);
        let mut private = EnvTree::new(PRIVATE_ENV_SCHEMA_URL);
        for (index, url) in urls.iter().enumerate() {
            let name = section_name(self.env_name, index);
            log::debug!("environment section {name}: {url}");

            public.sections.insert(
                name.clone(),
                EnvSection {
                    base_url: Some(url.to_string()),
                    security: security(&contributions.public_auth),
                    ..EnvSection::default()
                },
            );
            private.sections.insert(
                name,
                EnvSection {
                    security: security(&contributions.private_auth),
                    variables: contributions.private_vars.clone(),
                    ..EnvSection::default()
                },
            );
        }

        EnvironmentBuild {
            public,
            private,
            found_valid_base_url,
            diagnostics: contributions.diagnostics,
        }
    }

    fn contributions(&self, schemes: &IndexMap<String, SecuritySchemeOrRef>) -> Contributions {
        let mut out = Contributions::default();
        for (name, scheme) in schemes {
            let Some(scheme) = scheme.as_scheme() else {
                out.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SecuritySchemeUnresolvable,
                    format!("scheme {name}"),
                    "reference could not be resolved",
                ));
                continue;
            };
            match scheme.scheme_type {
                SecuritySchemeType::ApiKey => out.add_vars(name, &[scheme_alias(name)]),
                SecuritySchemeType::Http => {
                    let alias = scheme_alias(name);
                    match scheme.http_scheme().as_str() {
                        "basic" | "digest" => out.add_vars(
                            name,
                            &[format!("{alias}_USERNAME"), format!("{alias}_PASSWORD")],
                        ),
                        "bearer" => out.add_vars(name, &[format!("{alias}_TOKEN")]),
                        "ntlm" | "negotiate" => {}
                        other => out.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::SecuritySchemeUnresolvable,
                            format!("scheme {name}"),
                            format!("unsupported http scheme '{other}'"),
                        )),
                    }
                }
                SecuritySchemeType::OAuth2 => self.add_oauth2(name, scheme, &mut out),
                SecuritySchemeType::OpenIdConnect | SecuritySchemeType::MutualTls => {
                    log::debug!(
                        "scheme {name} ({}) has no env file representation",
                        scheme.scheme_type.as_str()
                    );
                }
                SecuritySchemeType::Unsupported => out.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::SecuritySchemeUnresolvable,
                    format!("scheme {name}"),
                    "unsupported scheme type",
                )),
            }
        }
        out
    }

    fn add_oauth2(&self, name: &str, scheme: &SecurityScheme, out: &mut Contributions) {
        let flows = scheme.flows.clone().unwrap_or_default();
        let Some((grant, flow)) = (self.select_flow)(&flows) else {
            out.diagnostics.push(Diagnostic::new(
                DiagnosticKind::OAuth2FlowSkipped,
                format!("scheme {name}"),
                "no OAuth2 flow declared",
            ));
            out.add_private_auth(
                name,
                PrivateAuth {
                    client_secret: Some(PLACEHOLDER.to_string()),
                    ..PrivateAuth::default()
                },
            );
            return;
        };

        if grant == GrantType::Implicit {
            out.diagnostics.push(Diagnostic::new(
                DiagnosticKind::OAuth2FlowSkipped,
                format!("scheme {name}"),
                "implicit grant has no token URL",
            ));
        } else {
            let public = public_oauth2(grant, flow);
            match public.validate() {
                Ok(()) => {
                    out.public_auth.insert(name.to_string(), public);
                }
                Err(e) => out.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::EnvironmentSectionValidation,
                    format!("scheme {name}"),
                    e,
                )),
            }
        }

        let private = private_oauth2(grant);
        if !private.is_empty() {
            out.add_private_auth(name, private);
        }
    }
}

impl Contributions {
    fn add_vars(&mut self, scheme: &str, keys: &[String]) {
        let mut section: EnvSection<PrivateAuth> = EnvSection::default();
        for key in keys {
            section
                .variables
                .insert(key.clone(), Value::String(PLACEHOLDER.to_string()));
        }
        match section.validate() {
            Ok(()) => self.private_vars.extend(section.variables),
            Err(e) => self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EnvironmentSectionValidation,
                format!("scheme {scheme}"),
                e,
            )),
        }
    }

    fn add_private_auth(&mut self, scheme: &str, auth: PrivateAuth) {
        match auth.validate() {
            Ok(()) => {
                self.private_auth.insert(scheme.to_string(), auth);
            }
            Err(e) => self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EnvironmentSectionValidation,
                format!("scheme {scheme}"),
                e,
            )),
        }
    }
}

fn public_oauth2(grant: GrantType, flow: &OAuthFlow) -> PublicOAuth2Auth {
    let mut auth = PublicOAuth2Auth::new(grant);
    match grant {
        GrantType::AuthorizationCode => {
            auth.auth_url = flow.authorization_url.clone();
            auth.token_url = flow.token_url.clone();
        }
        GrantType::ClientCredentials | GrantType::Password => {
            auth.token_url = flow.token_url.clone();
        }
        GrantType::Implicit => auth.auth_url = flow.authorization_url.clone(),
        GrantType::DeviceAuthorization => {
            auth.device_auth_url = flow.device_authorization_url.clone();
            auth.token_url = flow.token_url.clone();
        }
    }
    let mut scopes: Vec<&str> = flow.scopes.keys().map(String::as_str).collect();
    scopes.sort_unstable();
    if !scopes.is_empty() {
        auth.scope = Some(scopes.join(" "));
    }
    auth
}

fn private_oauth2(grant: GrantType) -> PrivateAuth {
    let secret = || Some(PLACEHOLDER.to_string());
    match grant {
        GrantType::AuthorizationCode | GrantType::ClientCredentials => PrivateAuth {
            client_secret: secret(),
            ..PrivateAuth::default()
        },
        GrantType::Password => PrivateAuth {
            client_secret: secret(),
            username: secret(),
            password: secret(),
        },
        GrantType::Implicit | GrantType::DeviceAuthorization => PrivateAuth::default(),
    }
}

fn security<A: Clone>(auth: &IndexMap<String, A>) -> Option<Security<A>> {
    (!auth.is_empty()).then(|| Security { auth: auth.clone() })
}
