use httpgen_core::ir::EnvTree;
use serde::Serialize;

use super::pretty_json;
use crate::error::RenderError;

/// One env file: `$schema` first, then sections in assigned order.
pub fn emit_env_file<A: Serialize>(tree: &EnvTree<A>) -> Result<String, RenderError> {
    let mut text = pretty_json(tree)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpgen_core::ir::{EnvSection, PLACEHOLDER, PRIVATE_ENV_SCHEMA_URL, PrivateEnv};

    #[test]
    fn test_private_env_file() {
        let mut tree: PrivateEnv = EnvTree::new(PRIVATE_ENV_SCHEMA_URL);
        let mut section = EnvSection::default();
        section
            .variables
            .insert("APIKEYAUTH".to_string(), serde_json::json!(PLACEHOLDER));
        tree.sections.insert("dev".to_string(), section);

        let text = emit_env_file(&tree).unwrap();
        insta::assert_snapshot!(text, @r#"
        {
            "$schema": "https://raw.githubusercontent.com/mistweaverco/kulala.nvim/main/schemas/http-client.private.env.schema.json",
            "dev": {
                "APIKEYAUTH": "CHANGE_ME"
            }
        }
        "#);
    }
}
