use std::collections::BTreeMap;

use crate::error::TransformError;
use crate::ir::{BaseUrl, DocumentInfo, HttpFileSpec, OperationFailure};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::server::Server;
use crate::parse::spec::OpenApiSpec;
use crate::sample::{SampleGenerator, SchemaSampler};

use super::environment::{DEFAULT_ENV_NAME, EnvironmentBuilder};
use super::request::RequestAssembler;

/// Options for [`generate_with_options`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Extra base URL, used verbatim.
    pub base_url: Option<String>,
    /// Base name for environment sections.
    pub env_name: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            env_name: DEFAULT_ENV_NAME.to_string(),
        }
    }
}

/// Build requests and environments with default options.
pub fn generate(spec: &OpenApiSpec) -> Result<HttpFileSpec, TransformError> {
    generate_with_options(spec, &GenerateOptions::default())
}

pub fn generate_with_options(
    spec: &OpenApiSpec,
    options: &GenerateOptions,
) -> Result<HttpFileSpec, TransformError> {
    generate_with_sampler(spec, options, &SchemaSampler::new())
}

/// Build requests and environments with a caller-supplied sample generator.
pub fn generate_with_sampler(
    spec: &OpenApiSpec,
    options: &GenerateOptions,
    sampler: &dyn SampleGenerator,
) -> Result<HttpFileSpec, TransformError> {
    // Phase 1: Resolve all $ref pointers
    let mut resolver = RefResolver::new(spec);
    let resolved = resolver.resolve_spec(spec)?;

    // Phase 2: One request per operation; failures stay per operation
    let schemes = resolved.security_schemes();
    let assembler = RequestAssembler::new(sampler, &schemes, resolved.security.as_deref());

    let mut requests = Vec::new();
    let mut failures = Vec::new();
    for (path, item) in &resolved.paths {
        for (method, op) in item.operations() {
            let params = item.parameters_for(op);
            match assembler.from_operation(method, path, &params, op) {
                Ok(request) => requests.push(request),
                Err(error) => {
                    log::warn!("skipping {method} {path}: {error}");
                    failures.push(OperationFailure {
                        method,
                        path: path.clone(),
                        error,
                    });
                }
            }
        }
    }

    // Phase 3: Base URLs for the shared block
    let base_urls = collect_base_urls(&resolved.servers, options.base_url.as_deref());

    // Phase 4: Environment files
    let environments = EnvironmentBuilder::new(&options.env_name).build(
        &resolved.servers,
        &schemes,
        options.base_url.as_deref(),
    );
    if !environments.found_valid_base_url {
        log::warn!("no usable base URL declared; environments use '/'");
    }

    Ok(HttpFileSpec {
        info: DocumentInfo {
            title: resolved.info.title.clone(),
            version: resolved.info.version.clone(),
            openapi: resolved.openapi.clone(),
        },
        base_urls,
        requests,
        failures,
        environments,
    })
}

/// Non-trivial server URLs plus the override, deduplicated and sorted.
fn collect_base_urls(servers: &[Server], override_url: Option<&str>) -> Vec<BaseUrl> {
    let mut urls: BTreeMap<String, String> = BTreeMap::new();
    for server in servers {
        urls.entry(server.url.clone())
            .or_insert_with(|| server.description.clone().unwrap_or_default());
    }
    if let Some(url) = override_url {
        urls.entry(url.to_string()).or_default();
    }
    urls.into_iter()
        .filter(|(url, _)| !Server::is_trivial_url(url))
        .map(|(value, description)| BaseUrl { value, description })
        .collect()
}
