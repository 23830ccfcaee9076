use httpgen_core::ir::{BaseUrl, OperationFailure, Request};
use minijinja::{Environment, context};

use super::request::{emit_failure, emit_request};
use crate::error::RenderError;
use crate::generator::RenderConfig;

/// Emit a complete `.http` file: the shared block, then one block per
/// request, then one commented block per failed operation.
pub fn emit_http_file(
    env: &Environment<'_>,
    base_urls: &[BaseUrl],
    requests: &[&Request],
    failures: &[&OperationFailure],
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let mut blocks = Vec::with_capacity(requests.len() + failures.len());
    for request in requests {
        blocks.push(emit_request(env, request, config)?);
    }
    for failure in failures {
        blocks.push(emit_failure(env, failure)?);
    }

    let tmpl = env.get_template("http_file.http.j2")?;
    Ok(tmpl.render(context! {
        header => config.editor_mode.header(),
        base_lines => base_lines(base_urls),
        blocks => blocks,
    })?)
}

/// The first base URL is active; the rest are commented out.
fn base_lines(base_urls: &[BaseUrl]) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, base) in base_urls.iter().enumerate() {
        let mut own = Vec::new();
        if !base.description.is_empty() {
            own.push(format!("# {}", base.description));
        }
        own.push(format!("@BASE_URL={}", base.value));
        if index == 0 {
            lines.extend(own);
        } else {
            lines.extend(own.into_iter().map(|line| format!("# {line}")));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpgen_core::config::EditorMode;

    #[test]
    fn test_shared_block_keeps_first_url_active() {
        let urls = vec![
            BaseUrl {
                value: "https://a.example.com".to_string(),
                description: "Production".to_string(),
            },
            BaseUrl {
                value: "https://b.example.com".to_string(),
                description: String::new(),
            },
        ];
        let env = crate::emitters::environment().unwrap();
        let text = emit_http_file(&env, &urls, &[], &[], &RenderConfig::default()).unwrap();
        insta::assert_snapshot!(text, @r"
        ### Shared

        # Production
        @BASE_URL=https://a.example.com
        # @BASE_URL=https://b.example.com
        ");
    }

    #[test]
    fn test_editor_header() {
        let urls = vec![BaseUrl {
            value: "https://api.example.com".to_string(),
            description: String::new(),
        }];
        let env = crate::emitters::environment().unwrap();
        let config = RenderConfig {
            editor_mode: EditorMode::Kulala,
            ..RenderConfig::default()
        };
        let text = emit_http_file(&env, &urls, &[], &[], &config).unwrap();
        insta::assert_snapshot!(text, @r"
        # Kulala.nvim HTTP file
        # https://github.com/mistweaverco/kulala.nvim

        ### Shared

        @BASE_URL=https://api.example.com
        ");

        for (mode, first) in [
            (EditorMode::Pycharm, "# JetBrains HTTP Client file\n"),
            (EditorMode::Httpyac, "# httpyac HTTP file\n"),
            (EditorMode::Default, "### Shared\n"),
        ] {
            let config = RenderConfig {
                editor_mode: mode,
                ..RenderConfig::default()
            };
            let text = emit_http_file(&env, &urls, &[], &[], &config).unwrap();
            assert!(text.starts_with(first), "{mode:?}: {text}");
        }
    }

    #[test]
    fn test_no_base_urls() {
        let env = crate::emitters::environment().unwrap();
        let text = emit_http_file(&env, &[], &[], &[], &RenderConfig::default()).unwrap();
        assert!(text.starts_with("### Shared\n"));
        assert!(!text.contains("@BASE_URL"));
    }
}
