use httpgen_core::ir::{ExampleEntry, OperationFailure, Request};
use minijinja::{Environment, context};
use serde::Serialize;

use super::{comment_lines, pretty_json, render_body};
use crate::error::RenderError;
use crate::generator::RenderConfig;

#[derive(Serialize)]
struct VariableContext<'a> {
    name: &'a str,
    value: &'a str,
    description: String,
}

#[derive(Serialize)]
struct RequestContext<'a> {
    title: String,
    notes: Vec<String>,
    params: Vec<VariableContext<'a>>,
    request_line: String,
    headers: Vec<(&'a str, &'a str)>,
    body: Option<String>,
    pre_script: Option<String>,
    post_script: Option<String>,
}

/// Emit one request block: the commented header, variable lines, request
/// line, headers and body.
pub fn emit_request(
    env: &Environment<'_>,
    request: &Request,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let body = match request.body.as_ref() {
        Some(body) => render_body(body, request.headers.get("Content-Type").map(String::as_str))?,
        None => None,
    };

    let ctx = RequestContext {
        title: format!("{} {}", request.method, request.path.replace('\n', "")),
        notes: notes(request, config)?,
        params: request
            .params
            .iter()
            .map(|var| VariableContext {
                name: &var.name,
                value: &var.value,
                description: var.description.split_whitespace().collect::<Vec<_>>().join(" "),
            })
            .collect(),
        request_line: format!("{} {{{{BASE_URL}}}}{}", request.method, request.path),
        headers: request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect(),
        body,
        pre_script: request.pre_script.as_deref().map(|s| script_block('<', s)),
        post_script: request.post_script.as_deref().map(|s| script_block('>', s)),
    };

    Ok(env.get_template("request.http.j2")?.render(ctx)?)
}

/// Emit a commented block for an operation that produced no request.
pub fn emit_failure(env: &Environment<'_>, failure: &OperationFailure) -> Result<String, RenderError> {
    let tmpl = env.get_template("failure.http.j2")?;
    Ok(tmpl.render(context! {
        method => failure.method.as_str(),
        path => &failure.path,
        error => failure.error.to_string(),
    })?)
}

/// `< {% script %}` for a pre-request script, `> {% script %}` for a
/// response handler. Multi-line scripts get the markers on their own lines.
fn script_block(marker: char, script: &str) -> String {
    let script = script.trim();
    if script.contains('\n') {
        format!("{marker} {{%\n{script}\n%}}")
    } else {
        format!("{marker} {{% {script} %}}")
    }
}

fn notes(request: &Request, config: &RenderConfig) -> Result<Vec<String>, RenderError> {
    let mut notes = Vec::new();

    if let Some(summary) = non_blank(request.summary.as_deref()) {
        notes.push(format!("### Summary: {summary}"));
    }
    if let Some(description) = non_blank(request.description.as_deref()) {
        if description.contains('\n') {
            notes.push("### Description:".to_string());
            notes.extend(
                description
                    .lines()
                    .map(|line| format!("###  {line}").trim_end().to_string()),
            );
        } else {
            notes.push(format!("### Description: {description}"));
        }
    }

    if config.include_schema && !request.request_examples.is_empty() {
        notes.push("### Request Body Examples".to_string());
        for entry in &request.request_examples {
            example_lines(entry, &mut notes)?;
        }
    }
    if config.include_examples && !request.response_examples.is_empty() {
        notes.push("### Response Examples".to_string());
        for entry in &request.response_examples {
            example_lines(entry, &mut notes)?;
        }
    }

    Ok(notes)
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn example_lines(entry: &ExampleEntry, out: &mut Vec<String>) -> Result<(), RenderError> {
    let mut label = Vec::new();
    if let Some(status) = entry.status.as_deref() {
        label.push(status.to_string());
    }
    match entry.content_type.as_deref() {
        Some(content_type) => label.push(content_type.to_string()),
        None => label.push("(no content)".to_string()),
    }
    if let Some(name) = entry.name.as_deref() {
        label.push(format!("({name})"));
    }
    out.push(format!("# {}", label.join(" ")));

    if entry.content_type.is_some() {
        match entry.value.as_ref() {
            Some(value) => out.extend(comment_lines(&pretty_json(value)?)),
            None => out.push("# (no example)".to_string()),
        }
    }
    Ok(())
}
