use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Project configuration loaded from `.httpgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpgenConfig {
    pub input: String,
    pub output: String,
    /// Base name for environment sections.
    pub env_name: String,
    /// Extra base URL appended as the last environment section.
    pub base_url: Option<String>,
    pub filemode: FileMode,
    /// Render commented response examples.
    pub include_examples: bool,
    /// Render commented request body examples.
    pub include_schema: bool,
    /// Target HTTP client; picks the file header.
    pub editor_mode: EditorMode,
    pub env: EnvConfig,
}

impl Default for HttpgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "requests.http".to_string(),
            env_name: "dev".to_string(),
            base_url: None,
            filemode: FileMode::Single,
            include_examples: false,
            include_schema: false,
            editor_mode: EditorMode::Default,
            env: EnvConfig::default(),
        }
    }
}

/// How requests are split into `.http` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    /// Every request in one file.
    #[default]
    Single,
    /// One file per path, in an output directory.
    Multi,
}

/// The HTTP client a generated file is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// Plain output every client understands.
    #[default]
    Default,
    /// Kulala.nvim.
    Kulala,
    /// JetBrains HTTP Client (IntelliJ, PyCharm).
    Pycharm,
    /// httpyac (VS Code).
    Httpyac,
}

impl EditorMode {
    /// Comment lines written at the top of every `.http` file.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            EditorMode::Default => &[],
            EditorMode::Kulala => &[
                "# Kulala.nvim HTTP file",
                "# https://github.com/mistweaverco/kulala.nvim",
            ],
            EditorMode::Pycharm => &[
                "# JetBrains HTTP Client file",
                "# https://www.jetbrains.com/help/idea/http-client-in-product-code-editor.html",
            ],
            EditorMode::Httpyac => &[
                "# httpyac HTTP file",
                "# https://httpyac.github.io",
            ],
        }
    }
}

/// Environment file options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub enabled: bool,
    pub public_filename: String,
    pub private_filename: String,
    /// Directory for env files; defaults to the output's directory.
    pub dir: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_filename: "http-client.env.json".to_string(),
            private_filename: "http-client.private.env.json".to_string(),
            dir: None,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".httpgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<HttpgenConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: HttpgenConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# httpgen configuration
input: openapi.yaml
output: requests.http       # a file (single) or a directory (multi)
filemode: single            # single | multi
env_name: dev               # sections become dev, dev2, dev3, ...
# base_url: http://localhost:8080
include_examples: false     # commented response examples
include_schema: false       # commented request body examples
editor_mode: default        # default | kulala | pycharm | httpyac

env:
  enabled: true
  public_filename: http-client.env.json
  private_filename: http-client.private.env.json
  # dir: .
"#
}
