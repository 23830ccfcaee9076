use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use walkdir::WalkDir;

use httpgen_core::batch::run_batch;
use httpgen_core::config::{self, CONFIG_FILE_NAME, EditorMode, FileMode, HttpgenConfig};
use httpgen_core::ir::{HttpFileSpec, HttpMethod};
use httpgen_core::parse::{self, operation::PathItem, ref_resolve::RefResolver, spec::OpenApiSpec};
use httpgen_core::sample::SchemaSampler;
use httpgen_core::transform::{self, GenerateOptions, body};
use httpgen_core::{CodeGenerator, GeneratedFile};
use httpgen_render::{EnvFileGenerator, HttpFileGenerator, RenderConfig};

#[derive(Parser)]
#[command(
    name = "httpgen",
    about = "Generate .http request files and env files from OpenAPI 3.x specs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .http file and env files from an OpenAPI spec
    Generate(GenerateArgs),

    /// Generate only the env files
    Env(EnvArgs),

    /// Summarize an OpenAPI spec
    Info {
        /// Path to the OpenAPI spec file (YAML or JSON)
        spec: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Check that every operation can be turned into a request
    Validate {
        /// Path to the OpenAPI spec file
        spec: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List the operations of a spec
    Paths {
        /// Path to the OpenAPI spec file
        spec: PathBuf,

        /// Only list these methods
        #[arg(short = 'm', long = "method")]
        methods: Vec<HttpMethod>,
    },

    /// Print sample request and response bodies for one path
    Sample(SampleArgs),

    /// Generate .http files for every spec under a directory
    Batch(BatchArgs),

    /// Write a default .httpgen.yaml
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FileModeArg {
    Single,
    Multi,
}

impl From<FileModeArg> for FileMode {
    fn from(mode: FileModeArg) -> Self {
        match mode {
            FileModeArg::Single => FileMode::Single,
            FileModeArg::Multi => FileMode::Multi,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EditorModeArg {
    /// Plain output for any client
    Default,
    /// Kulala.nvim
    Kulala,
    /// JetBrains HTTP Client
    #[value(aliases = ["intellij", "jetbrains"])]
    Pycharm,
    /// httpyac for VS Code
    #[value(alias = "vscode")]
    Httpyac,
}

impl From<EditorModeArg> for EditorMode {
    fn from(mode: EditorModeArg) -> Self {
        match mode {
            EditorModeArg::Default => EditorMode::Default,
            EditorModeArg::Kulala => EditorMode::Kulala,
            EditorModeArg::Pycharm => EditorMode::Pycharm,
            EditorModeArg::Httpyac => EditorMode::Httpyac,
        }
    }
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Path to the OpenAPI spec file; defaults to the config's `input`
    spec: Option<PathBuf>,

    /// Output file (single) or directory (multi)
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[arg(long, value_enum)]
    filemode: Option<FileModeArg>,

    /// HTTP client the file is written for
    #[arg(long, value_enum)]
    mode: Option<EditorModeArg>,

    /// Add commented response examples
    #[arg(long)]
    include_examples: bool,

    /// Add commented request body examples
    #[arg(long)]
    include_schema: bool,

    /// Skip the env files
    #[arg(long)]
    no_env: bool,

    #[command(flatten)]
    env: EnvOptions,

    #[command(flatten)]
    write: WriteOptions,
}

#[derive(Args, Debug, Default)]
struct EnvArgs {
    /// Path to the OpenAPI spec file; defaults to the config's `input`
    spec: Option<PathBuf>,

    #[command(flatten)]
    env: EnvOptions,

    #[command(flatten)]
    write: WriteOptions,
}

#[derive(Args, Debug, Default)]
struct EnvOptions {
    /// Extra base URL, added as the last environment section
    #[arg(long)]
    base_url: Option<String>,

    /// Base name for environment sections (dev, dev2, ...)
    #[arg(long)]
    env_name: Option<String>,

    /// Directory for the env files
    #[arg(long)]
    env_dir: Option<PathBuf>,

    #[arg(long)]
    public_env_filename: Option<String>,

    #[arg(long)]
    private_env_filename: Option<String>,
}

#[derive(Args, Debug, Default, Clone, Copy)]
struct WriteOptions {
    /// Replace existing output files
    #[arg(long)]
    overwrite: bool,

    /// Print the files instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Path to the OpenAPI spec file
    spec: PathBuf,

    /// Path as declared in the document, e.g. /pets/{petId}
    path: String,

    #[arg(short, long)]
    method: Option<HttpMethod>,

    /// Only this response status
    #[arg(long)]
    status: Option<String>,

    /// Only this content type
    #[arg(long)]
    content_type: Option<String>,

    #[arg(long)]
    no_request: bool,

    #[arg(long)]
    no_response: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// A spec file, or a directory searched recursively
    input: PathBuf,

    /// File name pattern where `*` matches any run of characters;
    /// defaults to .yaml, .yml and .json files
    #[arg(long)]
    pattern: Option<String>,

    /// Output directory; each spec gets a subdirectory mirroring its path
    /// under the input
    #[arg(short, long, default_value = "http")]
    out: PathBuf,

    /// HTTP client the files are written for
    #[arg(long, value_enum)]
    mode: Option<EditorModeArg>,

    /// Skip the env files
    #[arg(long)]
    no_env: bool,

    #[command(flatten)]
    write: WriteOptions,
}

impl EnvOptions {
    fn apply(&self, cfg: &mut HttpgenConfig) {
        if let Some(ref url) = self.base_url {
            cfg.base_url = Some(url.clone());
        }
        if let Some(ref name) = self.env_name {
            cfg.env_name = name.clone();
        }
        if let Some(ref dir) = self.env_dir {
            cfg.env.dir = Some(dir.display().to_string());
        }
        if let Some(ref name) = self.public_env_filename {
            cfg.env.public_filename = name.clone();
        }
        if let Some(ref name) = self.private_env_filename {
            cfg.env.private_filename = name.clone();
        }
    }
}

impl GenerateArgs {
    fn apply(&self, cfg: &mut HttpgenConfig) {
        if let Some(ref spec) = self.spec {
            cfg.input = spec.display().to_string();
        }
        if let Some(ref out) = self.out {
            cfg.output = out.display().to_string();
        }
        if let Some(mode) = self.filemode {
            cfg.filemode = mode.into();
        }
        if let Some(mode) = self.mode {
            cfg.editor_mode = mode.into();
        }
        cfg.include_examples |= self.include_examples;
        cfg.include_schema |= self.include_schema;
        if self.no_env {
            cfg.env.enabled = false;
        }
        self.env.apply(cfg);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Env(args) => cmd_env(args),

        Commands::Info { spec, json } => cmd_info(&spec, json),

        Commands::Validate { spec, json } => cmd_validate(&spec, json),

        Commands::Paths { spec, methods } => cmd_paths(&spec, &methods),

        Commands::Sample(args) => cmd_sample(&args),

        Commands::Batch(args) => cmd_batch(&args),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "httpgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<HttpgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str());
    let spec = parse::from_path_str(ext, &content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    log::debug!("{}: OpenAPI {}, {} paths", path.display(), spec.openapi, spec.paths.len());
    Ok(spec)
}

fn build(spec: &OpenApiSpec, cfg: &HttpgenConfig) -> Result<HttpFileSpec> {
    let options = GenerateOptions {
        base_url: cfg.base_url.clone(),
        env_name: cfg.env_name.clone(),
    };
    Ok(transform::generate_with_options(spec, &options)?)
}

/// Every file to write for one spec, with paths resolved against the
/// configured output locations.
fn plan_outputs(
    http: &HttpFileSpec,
    cfg: &HttpgenConfig,
    include_requests: bool,
) -> Result<Vec<GeneratedFile>> {
    let output = PathBuf::from(&cfg.output);
    let output_dir = match cfg.filemode {
        FileMode::Single => output.parent().map(Path::to_path_buf).unwrap_or_default(),
        FileMode::Multi => output.clone(),
    };

    let mut files = Vec::new();
    if include_requests {
        let rendered = HttpFileGenerator.generate(http, &RenderConfig::from_config(cfg))?;
        files.extend(rebase(&output_dir, rendered));
    }

    let env_dir = cfg.env.dir.as_ref().map(PathBuf::from).unwrap_or(output_dir);
    files.extend(rebase(&env_dir, EnvFileGenerator.generate(http, &cfg.env)?));
    Ok(files)
}

fn rebase(dir: &Path, files: Vec<GeneratedFile>) -> impl Iterator<Item = GeneratedFile> + '_ {
    files.into_iter().map(move |file| GeneratedFile {
        path: dir.join(&file.path).display().to_string(),
        content: file.content,
    })
}

/// Write generated files. Without `overwrite`, nothing is written when any
/// target already exists and the error names the existing files.
fn write_outputs(files: &[GeneratedFile], options: WriteOptions) -> Result<()> {
    if options.dry_run {
        for file in files {
            println!("==> {} <==", file.path);
            println!("{}", file.content);
        }
        return Ok(());
    }

    if !options.overwrite {
        let existing: Vec<&str> = files
            .iter()
            .map(|f| f.path.as_str())
            .filter(|p| Path::new(p).exists())
            .collect();
        if !existing.is_empty() {
            anyhow::bail!(
                "refusing to overwrite {}. Use --overwrite to replace.",
                existing.join(", ")
            );
        }
    }

    for file in files {
        let path = Path::new(&file.path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !options.quiet {
            eprintln!("  wrote {}", path.display());
        }
    }
    Ok(())
}

fn report(http: &HttpFileSpec, quiet: bool) {
    if !http.environments.found_valid_base_url {
        eprintln!("warning: no valid base URL found in servers; pass --base-url or edit the env file");
    }
    for failure in &http.failures {
        eprintln!("  skipped {failure}");
    }
    if !quiet {
        eprintln!(
            "{}: {} requests, {} skipped",
            http.info.title,
            http.requests.len(),
            http.failures.len()
        );
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    args.apply(&mut cfg);

    let spec = load_spec(Path::new(&cfg.input))?;
    let http = build(&spec, &cfg)?;
    report(&http, args.write.quiet);

    let files = plan_outputs(&http, &cfg, true)?;
    write_outputs(&files, args.write)
}

fn cmd_env(args: EnvArgs) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    if let Some(ref spec) = args.spec {
        cfg.input = spec.display().to_string();
    }
    args.env.apply(&mut cfg);
    cfg.env.enabled = true;

    let spec = load_spec(Path::new(&cfg.input))?;
    let http = build(&spec, &cfg)?;
    if !http.environments.found_valid_base_url {
        eprintln!("warning: no valid base URL found in servers; pass --base-url or edit the env file");
    }

    let files = plan_outputs(&http, &cfg, false)?;
    write_outputs(&files, args.write)
}

fn info_summary(spec: &OpenApiSpec) -> Value {
    let mut counts: IndexMap<HttpMethod, usize> = IndexMap::new();
    for item in spec.paths.values() {
        for (method, _) in item.operations() {
            *counts.entry(method).or_default() += 1;
        }
    }
    let operations: Map<String, Value> = HttpMethod::ALL
        .iter()
        .filter_map(|m| counts.get(m).map(|n| (m.to_string(), json!(n))))
        .collect();

    let schemes: Map<String, Value> = spec
        .security_schemes()
        .iter()
        .map(|(name, scheme)| {
            let kind = scheme
                .as_scheme()
                .map(|s| s.scheme_type.as_str())
                .unwrap_or("$ref");
            (name.clone(), json!(kind))
        })
        .collect();

    json!({
        "title": spec.info.title,
        "version": spec.info.version,
        "openapi": spec.openapi,
        "revision": spec.revision().map(|r| r.as_str()),
        "servers": spec.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "paths": spec.paths.len(),
        "operations": operations,
        "security_schemes": schemes,
    })
}

fn cmd_info(path: &Path, as_json: bool) -> Result<()> {
    let spec = load_spec(path)?;
    let summary = info_summary(&spec);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {} (OpenAPI {})", spec.info.title, spec.info.version, spec.openapi);
    if spec.servers.is_empty() {
        println!("  Servers: none");
    }
    for server in &spec.servers {
        match server.description.as_deref() {
            Some(desc) => println!("  Server: {} ({desc})", server.url),
            None => println!("  Server: {}", server.url),
        }
    }
    println!("  Paths: {}", spec.paths.len());
    if let Some(operations) = summary["operations"].as_object() {
        for (method, count) in operations {
            println!("  {method}: {count}");
        }
    }
    if let Some(schemes) = summary["security_schemes"].as_object() {
        for (name, kind) in schemes {
            println!("  Security scheme {name}: {}", kind.as_str().unwrap_or_default());
        }
    }
    Ok(())
}

fn cmd_validate(path: &Path, as_json: bool) -> Result<()> {
    let spec = load_spec(path)?;
    let http = transform::generate(&spec)?;
    let diagnostics: Vec<_> = http.diagnostics().collect();

    if as_json {
        let result = json!({
            "valid": http.failures.is_empty(),
            "openapi": spec.openapi,
            "requests": http.requests.len(),
            "failures": http.failures,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        eprintln!("OpenAPI {} spec: {}", spec.openapi, spec.info.title);
        eprintln!("  Operations: {}", spec.operation_count());
        eprintln!("  Requests: {}", http.requests.len());
        for failure in &http.failures {
            eprintln!("  error: {failure}");
        }
        for diagnostic in &diagnostics {
            eprintln!("  warning: {diagnostic}");
        }
    }

    if !http.failures.is_empty() {
        anyhow::bail!("{} operations could not be converted", http.failures.len());
    }
    if !as_json {
        eprintln!("Validation successful.");
    }
    Ok(())
}

fn cmd_paths(path: &Path, methods: &[HttpMethod]) -> Result<()> {
    let spec = load_spec(path)?;
    for (path, item) in &spec.paths {
        for (method, _) in item.operations() {
            if methods.is_empty() || methods.contains(&method) {
                println!("{method} {path}");
            }
        }
    }
    Ok(())
}

fn cmd_sample(args: &SampleArgs) -> Result<()> {
    let spec = load_spec(&args.spec)?;
    let resolved = RefResolver::new(&spec).resolve_spec(&spec)?;
    let item = resolved
        .paths
        .get(&args.path)
        .with_context(|| format!("path {} not found", args.path))?;

    let samples = sample_operations(item, args);
    if samples.is_empty() {
        anyhow::bail!("no matching operation on {}", args.path);
    }
    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}

/// Method → `request` (content type → body) and `responses`
/// (status → content type → body).
fn sample_operations(item: &PathItem, args: &SampleArgs) -> Map<String, Value> {
    let sampler = SchemaSampler::new();
    let wanted = |content_type: &str| {
        args.content_type
            .as_deref()
            .is_none_or(|want| want == content_type)
    };

    let mut out = Map::new();
    for (method, op) in item.operations() {
        if args.method.is_some_and(|m| m != method) {
            continue;
        }
        let mut diagnostics = Vec::new();
        let mut entry = Map::new();

        if !args.no_request {
            let bodies: Map<String, Value> = body::resolve_request_body(op, &sampler, &mut diagnostics)
                .into_iter()
                .filter(|(content_type, _)| wanted(content_type))
                .map(|(content_type, resolved)| (content_type, resolved.body.unwrap_or(Value::Null)))
                .collect();
            entry.insert("request".to_string(), Value::Object(bodies));
        }

        if !args.no_response {
            let mut responses = Map::new();
            for (status, contents) in body::resolve_responses(op, &sampler, &mut diagnostics) {
                if args.status.as_ref().is_some_and(|want| *want != status) {
                    continue;
                }
                let contents: Map<String, Value> = contents
                    .into_iter()
                    .filter(|(content_type, _)| wanted(content_type))
                    .map(|(content_type, value)| (content_type, value.unwrap_or(Value::Null)))
                    .collect();
                responses.insert(status, Value::Object(contents));
            }
            entry.insert("responses".to_string(), Value::Object(responses));
        }

        for diagnostic in &diagnostics {
            eprintln!("warning: {method} {diagnostic}");
        }
        out.insert(method.to_string(), Value::Object(entry));
    }
    out
}

/// `*` matches any run of characters; everything else matches literally.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

fn is_spec_file(name: &str) -> bool {
    [".yaml", ".yml", ".json"]
        .iter()
        .any(|ext| name.ends_with(ext))
}

/// Spec files under `input` in sorted order, or `input` itself if it is a file.
fn collect_spec_files(input: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("{} does not exist", input.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| match pattern {
                    Some(pattern) => matches_pattern(name, pattern),
                    None => is_spec_file(name),
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Output directory for one batch item. It mirrors the item's location under
/// the input root and keeps the extension, so `a/api.yaml`, `b/api.yaml` and
/// `api.json` land in `a/api_yaml`, `b/api_yaml` and `api_json`.
fn batch_output_dir(out: &Path, input: &Path, spec: &Path) -> PathBuf {
    let rel = spec
        .strip_prefix(input)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or_else(|| spec.file_name().map(Path::new).unwrap_or(spec));
    let name = rel
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("spec")
        .replace('.', "_");
    match rel.parent() {
        Some(parent) => out.join(parent).join(name),
        None => out.join(name),
    }
}

fn batch_item(path: &Path, args: &BatchArgs, base: &HttpgenConfig) -> Result<usize> {
    let mut cfg = base.clone();
    cfg.input = path.display().to_string();
    cfg.output = batch_output_dir(&args.out, &args.input, path)
        .join("requests.http")
        .display()
        .to_string();
    cfg.filemode = FileMode::Single;
    if let Some(mode) = args.mode {
        cfg.editor_mode = mode.into();
    }
    cfg.env.enabled = !args.no_env;
    cfg.env.dir = None;

    let spec = load_spec(path)?;
    let http = build(&spec, &cfg)?;
    if !http.environments.found_valid_base_url {
        eprintln!("warning: {}: no valid base URL found in servers", path.display());
    }
    let files = plan_outputs(&http, &cfg, true)?;
    write_outputs(&files, args.write)?;
    Ok(http.requests.len())
}

fn cmd_batch(args: &BatchArgs) -> Result<()> {
    let base = try_load_config()?.unwrap_or_default();
    let items = collect_spec_files(&args.input, args.pattern.as_deref())?;
    if items.is_empty() {
        anyhow::bail!("no spec files found in {}", args.input.display());
    }
    if !args.write.quiet {
        eprintln!("Processing {} specs", items.len());
    }

    let report = run_batch(
        items.iter().map(|p| p.display().to_string()),
        |item: &str| batch_item(Path::new(item), args, &base),
    );

    if !args.write.quiet {
        for (item, count) in &report.succeeded {
            eprintln!("  ok {item} ({count} requests)");
        }
    }
    for failure in &report.failed {
        eprintln!("  failed {failure}");
    }
    eprintln!("{}", report.summary());

    if !report.is_success() {
        anyhow::bail!("{} of {} specs failed", report.failed.len(), items.len());
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
openapi: "3.0.3"
info: {title: Pets, version: "1"}
servers:
  - url: https://api.example.com
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {type: object, properties: {name: {type: string}}}
    post:
      requestBody:
        content:
          application/json:
            example: {name: Rex}
      responses:
        "201": {description: created}
  /pets/{petId}:
    delete:
      parameters:
        - {name: petId, in: path, required: true, schema: {type: integer}}
      responses:
        "204": {description: deleted}
"#;

    fn http() -> HttpFileSpec {
        let spec = parse::from_yaml(SPEC).unwrap();
        transform::generate(&spec).unwrap()
    }

    fn paths(files: &[GeneratedFile]) -> Vec<String> {
        files.iter().map(|f| f.path.clone()).collect()
    }

    #[test]
    fn test_generate_flags_override_config() {
        let cli = Cli::try_parse_from([
            "httpgen",
            "generate",
            "api.yaml",
            "--filemode",
            "multi",
            "--base-url",
            "http://localhost:8080",
            "--env-name",
            "local",
            "--no-env",
            "--mode",
            "vscode",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let mut cfg = HttpgenConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.input, "api.yaml");
        assert_eq!(cfg.filemode, FileMode::Multi);
        assert_eq!(cfg.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cfg.env_name, "local");
        assert!(!cfg.env.enabled);
        assert_eq!(cfg.editor_mode, EditorMode::Httpyac);
        assert_eq!(cfg.output, "requests.http");
    }

    #[test]
    fn test_paths_accepts_methods() {
        let cli = Cli::try_parse_from(["httpgen", "paths", "api.yaml", "-m", "get", "--method", "POST"])
            .unwrap();
        let Commands::Paths { methods, .. } = cli.command else {
            panic!("expected paths");
        };
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_plan_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = HttpgenConfig {
            output: dir.path().join("api.http").display().to_string(),
            ..HttpgenConfig::default()
        };
        let files = plan_outputs(&http(), &cfg, true).unwrap();
        let expected: Vec<String> = ["api.http", "http-client.env.json", "http-client.private.env.json"]
            .iter()
            .map(|name| dir.path().join(name).display().to_string())
            .collect();
        assert_eq!(paths(&files), expected);
    }

    #[test]
    fn test_plan_multi_file_with_env_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = HttpgenConfig {
            output: dir.path().join("out").display().to_string(),
            filemode: FileMode::Multi,
            ..HttpgenConfig::default()
        };
        cfg.env.dir = Some(dir.path().join("env").display().to_string());
        let files = plan_outputs(&http(), &cfg, true).unwrap();
        let expected = vec![
            dir.path().join("out").join("pets.http"),
            dir.path().join("out").join("pets_pet_id.http"),
            dir.path().join("env").join("http-client.env.json"),
            dir.path().join("env").join("http-client.private.env.json"),
        ];
        let expected: Vec<String> = expected.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(paths(&files), expected);

        let env_only = plan_outputs(&http(), &cfg, false).unwrap();
        assert_eq!(env_only.len(), 2);
    }

    #[test]
    fn test_write_outputs_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("requests.http");
        let files = vec![GeneratedFile {
            path: target.display().to_string(),
            content: "GET {{BASE_URL}}/pets\n".to_string(),
        }];

        write_outputs(&files, WriteOptions::default()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "GET {{BASE_URL}}/pets\n");

        let changed = vec![GeneratedFile {
            path: target.display().to_string(),
            content: "changed".to_string(),
        }];
        let err = write_outputs(&changed, WriteOptions::default()).unwrap_err();
        assert!(err.to_string().contains("--overwrite"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "GET {{BASE_URL}}/pets\n");

        let overwrite = WriteOptions {
            overwrite: true,
            ..WriteOptions::default()
        };
        write_outputs(&changed, overwrite).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "changed");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("requests.http");
        let files = vec![GeneratedFile {
            path: target.display().to_string(),
            content: String::new(),
        }];
        let dry_run = WriteOptions {
            dry_run: true,
            ..WriteOptions::default()
        };
        write_outputs(&files, dry_run).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("petstore.yaml", "*.yaml"));
        assert!(!matches_pattern("petstore.json", "*.yaml"));
        assert!(matches_pattern("petstore-v2.yaml", "pet*-v*.yaml"));
        assert!(matches_pattern("exact.json", "exact.json"));
        assert!(!matches_pattern("exact.json.bak", "exact.json"));
        assert!(matches_pattern("anything", "*"));
    }

    #[test]
    fn test_collect_spec_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        for name in ["b.yaml", "a.json", "notes.txt", "sub/c.yml"] {
            fs::write(dir.path().join(name), SPEC).unwrap();
        }

        let found = collect_spec_files(dir.path(), None).unwrap();
        let names: Vec<&str> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml", "c.yml"]);

        let yaml_only = collect_spec_files(dir.path(), Some("*.yaml")).unwrap();
        assert_eq!(yaml_only.len(), 1);

        let single = collect_spec_files(&dir.path().join("b.yaml"), None).unwrap();
        assert_eq!(single.len(), 1);
        assert!(collect_spec_files(&dir.path().join("missing"), None).is_err());
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        let bad = dir.path().join("bad.yaml");
        fs::write(&good, SPEC).unwrap();
        fs::write(&bad, "openapi: \"2.0\"\ninfo: {title: Old, version: \"1\"}\n").unwrap();

        let items = collect_spec_files(dir.path(), None).unwrap();
        let report = run_batch(
            items.iter().map(|p| p.display().to_string()),
            |item: &str| -> Result<usize> {
                let spec = load_spec(Path::new(item))?;
                Ok(build(&spec, &HttpgenConfig::default())?.requests.len())
            },
        );
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.succeeded[0].1, 3);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].item.ends_with("bad.yaml"));
        assert_eq!(report.summary(), "Done. OK: 1  Failed: 1");
    }

    #[test]
    fn test_batch_outputs_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("specs");
        fs::create_dir_all(input.join("a")).unwrap();
        fs::create_dir_all(input.join("b")).unwrap();
        for name in ["a/api.yaml", "b/api.yaml"] {
            fs::write(input.join(name), SPEC).unwrap();
        }
        let json_spec = json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1"},
            "paths": {"/pets": {"get": {"responses": {"200": {"description": "ok"}}}}}
        });
        fs::write(input.join("api.json"), json_spec.to_string()).unwrap();

        let args = BatchArgs {
            input: input.clone(),
            pattern: None,
            out: dir.path().join("http"),
            mode: Some(EditorModeArg::Kulala),
            no_env: true,
            write: WriteOptions {
                quiet: true,
                ..WriteOptions::default()
            },
        };
        let base = HttpgenConfig::default();
        let items = collect_spec_files(&input, None).unwrap();
        let report = run_batch(
            items.iter().map(|p| p.display().to_string()),
            |item: &str| batch_item(Path::new(item), &args, &base),
        );
        assert!(report.is_success(), "{}", report.summary());
        assert_eq!(report.succeeded.len(), 3);

        for rel in ["a/api_yaml", "b/api_yaml", "api_json"] {
            let written = args.out.join(rel).join("requests.http");
            let content = fs::read_to_string(&written).unwrap();
            assert!(content.starts_with("# Kulala.nvim HTTP file\n"), "{}", written.display());
        }

        let single = input.join("a").join("api.yaml");
        assert_eq!(
            batch_output_dir(&args.out, &single, &single),
            args.out.join("api_yaml")
        );
    }

    #[test]
    fn test_info_summary_counts_methods() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let summary = info_summary(&spec);
        assert_eq!(summary["revision"], "3.0");
        assert_eq!(summary["paths"], 2);
        assert_eq!(summary["operations"], json!({"GET": 1, "POST": 1, "DELETE": 1}));
        assert_eq!(summary["servers"], json!(["https://api.example.com"]));
    }

    #[test]
    fn test_sample_operations_filters() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let resolved = RefResolver::new(&spec).resolve_spec(&spec).unwrap();
        let args = SampleArgs {
            spec: PathBuf::from("api.yaml"),
            path: "/pets".to_string(),
            method: Some(HttpMethod::Get),
            status: None,
            content_type: None,
            no_request: true,
            no_response: false,
        };
        let samples = sample_operations(&resolved.paths["/pets"], &args);
        assert_eq!(
            Value::Object(samples),
            json!({"GET": {"responses": {"200": {"application/json": {"name": "string"}}}}})
        );
    }
}
