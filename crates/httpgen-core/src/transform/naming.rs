use heck::ToSnakeCase;

/// Variable alias for a security scheme: every non-alphanumeric character
/// becomes `_`, then the whole name is uppercased.
///
/// - `ApiKeyAuth` → `APIKEYAUTH`
/// - `petstore-auth` → `PETSTORE_AUTH`
pub fn scheme_alias(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// File stem for the requests of one path: `/users/{id}` → `users_id`,
/// `/` → `root`.
pub fn path_slug(path: &str) -> String {
    let slug = path.to_snake_case();
    if slug.is_empty() {
        "root".to_string()
    } else {
        slug
    }
}

/// Environment section name: `dev`, `dev2`, `dev3`, ...
pub fn section_name(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}{}", index + 1)
    }
}

/// `{{name}}`.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}
