use httpgen_core::config::{EditorMode, EnvConfig, FileMode, HttpgenConfig};
use httpgen_core::ir::{HttpFileSpec, OperationFailure, Request};
use httpgen_core::transform::naming::path_slug;
use httpgen_core::{CodeGenerator, GeneratedFile};
use indexmap::IndexMap;

use crate::emitters;
use crate::error::RenderError;

/// Options for [`HttpFileGenerator`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub filemode: FileMode,
    pub include_examples: bool,
    pub include_schema: bool,
    pub editor_mode: EditorMode,
    /// File name used in single-file mode.
    pub file_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            filemode: FileMode::Single,
            include_examples: false,
            include_schema: false,
            editor_mode: EditorMode::Default,
            file_name: "requests.http".to_string(),
        }
    }
}

impl RenderConfig {
    /// Render options from a project config. The single-file name is the last
    /// component of `output`.
    pub fn from_config(config: &HttpgenConfig) -> Self {
        let file_name = std::path::Path::new(&config.output)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("requests.http")
            .to_string();
        Self {
            filemode: config.filemode,
            include_examples: config.include_examples,
            include_schema: config.include_schema,
            editor_mode: config.editor_mode,
            file_name,
        }
    }
}

/// Renders `.http` request files.
pub struct HttpFileGenerator;

impl CodeGenerator for HttpFileGenerator {
    type Config = RenderConfig;
    type Error = RenderError;

    fn generate(
        &self,
        spec: &HttpFileSpec,
        config: &RenderConfig,
    ) -> Result<Vec<GeneratedFile>, RenderError> {
        let env = emitters::environment()?;

        match config.filemode {
            FileMode::Single => {
                let requests: Vec<&Request> = spec.requests.iter().collect();
                let failures: Vec<&OperationFailure> = spec.failures.iter().collect();
                let content = emitters::http_file::emit_http_file(
                    &env,
                    &spec.base_urls,
                    &requests,
                    &failures,
                    config,
                )?;
                Ok(vec![GeneratedFile {
                    path: config.file_name.clone(),
                    content,
                }])
            }
            FileMode::Multi => {
                let mut groups: IndexMap<String, (Vec<&Request>, Vec<&OperationFailure>)> =
                    IndexMap::new();
                for request in &spec.requests {
                    groups
                        .entry(path_slug(request.base_path()))
                        .or_default()
                        .0
                        .push(request);
                }
                for failure in &spec.failures {
                    groups
                        .entry(path_slug(&failure.path))
                        .or_default()
                        .1
                        .push(failure);
                }

                let mut files = Vec::with_capacity(groups.len());
                for (slug, (requests, failures)) in groups {
                    log::debug!("{slug}.http: {} requests", requests.len());
                    let content = emitters::http_file::emit_http_file(
                        &env,
                        &spec.base_urls,
                        &requests,
                        &failures,
                        config,
                    )?;
                    files.push(GeneratedFile {
                        path: format!("{slug}.http"),
                        content,
                    });
                }
                Ok(files)
            }
        }
    }
}

/// Renders the public and private env JSON files.
pub struct EnvFileGenerator;

impl CodeGenerator for EnvFileGenerator {
    type Config = EnvConfig;
    type Error = RenderError;

    fn generate(
        &self,
        spec: &HttpFileSpec,
        config: &EnvConfig,
    ) -> Result<Vec<GeneratedFile>, RenderError> {
        if !config.enabled {
            return Ok(Vec::new());
        }
        let env = &spec.environments;
        Ok(vec![
            GeneratedFile {
                path: config.public_filename.clone(),
                content: emitters::env::emit_env_file(&env.public)?,
            },
            GeneratedFile {
                path: config.private_filename.clone(),
                content: emitters::env::emit_env_file(&env.private)?,
            },
        ])
    }
}
