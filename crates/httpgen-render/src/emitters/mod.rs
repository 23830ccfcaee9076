pub mod env;
pub mod http_file;
pub mod request;

use minijinja::Environment;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::RenderError;

/// A template environment with every `.http` template registered.
pub fn environment() -> Result<Environment<'static>, RenderError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template(
        "http_file.http.j2",
        include_str!("../../templates/http_file.http.j2"),
    )?;
    env.add_template(
        "request.http.j2",
        include_str!("../../templates/request.http.j2"),
    )?;
    env.add_template(
        "failure.http.j2",
        include_str!("../../templates/failure.http.j2"),
    )?;
    Ok(env)
}

/// JSON with four-space indentation.
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Prefix every line with `# `.
fn comment_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(|line| {
        if line.is_empty() {
            "#".to_string()
        } else {
            format!("# {line}")
        }
    })
}

/// Form bodies become `a=b&c=d`; non-JSON string bodies are written raw;
/// everything else is pretty JSON. A null body renders nothing.
fn render_body(body: &Value, content_type: Option<&str>) -> Result<Option<String>, RenderError> {
    let content_type = content_type.unwrap_or_default();
    match body {
        Value::Null => Ok(None),
        Value::Object(fields) if content_type.starts_with("application/x-www-form-urlencoded") => {
            let pairs: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}={}", httpgen_core::transform::params::value_text(value)))
                .collect();
            Ok(Some(pairs.join("&")))
        }
        Value::String(text) if !content_type.contains("json") => Ok(Some(text.clone())),
        other => pretty_json(other).map(Some),
    }
}
