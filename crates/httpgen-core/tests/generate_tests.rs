use httpgen_core::error::RequestError;
use httpgen_core::ir::{DiagnosticKind, GrantType, HttpFileSpec, HttpMethod, Request};
use httpgen_core::parse;
use httpgen_core::transform::{GenerateOptions, generate, generate_with_options};
use serde_json::json;

const PETSTORE: &str = include_str!("fixtures/petstore-3.0.yaml");
const LIBRARY: &str = include_str!("fixtures/library-3.1.yaml");

fn petstore() -> HttpFileSpec {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    generate(&spec).expect("should generate petstore")
}

fn library() -> HttpFileSpec {
    let spec = parse::from_yaml(LIBRARY).unwrap();
    generate(&spec).expect("should generate library")
}

fn request<'a>(spec: &'a HttpFileSpec, method: HttpMethod, base_path: &str) -> &'a Request {
    spec.requests
        .iter()
        .find(|r| r.method == method && r.base_path() == base_path)
        .unwrap_or_else(|| panic!("no request {method} {base_path}"))
}

#[test]
fn petstore_requests_and_failures() {
    let spec = petstore();
    let order: Vec<(HttpMethod, &str)> = spec
        .requests
        .iter()
        .map(|r| (r.method, r.base_path()))
        .collect();
    assert_eq!(
        order,
        vec![
            (HttpMethod::Get, "/pets"),
            (HttpMethod::Post, "/pets"),
            (HttpMethod::Get, "/pets/{{petId}}"),
            (HttpMethod::Delete, "/pets/{{petId}}"),
            (HttpMethod::Get, "/stores/{storeId}/inventory"),
        ]
    );

    assert_eq!(spec.failures.len(), 2);
    assert_eq!(spec.failures[0].method, HttpMethod::Get);
    assert_eq!(spec.failures[0].path, "/pets/{petId}/photos");
    assert!(matches!(
        spec.failures[0].error,
        RequestError::ParameterNotFound { ref name, .. } if name == "photoId"
    ));
    assert_eq!(spec.failures[1].method, HttpMethod::Put);
    assert!(matches!(
        spec.failures[1].error,
        RequestError::UnsupportedContentType { .. }
    ));
}

#[test]
fn query_parameters_become_segments() {
    let spec = petstore();
    let list = &spec.requests[0];
    insta::assert_snapshot!(list.path, @r"
    /pets
    ?limit={{limit}}
    &tag={{tag}}
    ");
    let segments: Vec<&str> = list.query_segments().collect();
    assert_eq!(segments.len(), 2);
    assert_eq!(list.params[0].value, "1");
    assert_eq!(list.params[1].value, "dog");
    assert_eq!(list.params[1].description, "Filter by tag");
}

#[test]
fn api_key_header_from_root_security() {
    let spec = petstore();
    let list = &spec.requests[0];
    assert_eq!(list.headers["X-API-Key"], "{{APIKEYAUTH}}");
    assert!(!list.headers.contains_key("Authorization"));
}

#[test]
fn operation_security_overrides_root() {
    let spec = petstore();
    let create = request(&spec, HttpMethod::Post, "/pets");
    assert_eq!(
        create.headers["Authorization"],
        "Bearer {{$auth.token(\"petstore_auth\")}}"
    );
    assert!(!create.headers.contains_key("X-API-Key"));
    assert_eq!(create.body, Some(json!({"name": "Rex", "tag": "dog"})));

    let delete = request(&spec, HttpMethod::Delete, "/pets/{{petId}}");
    assert!(delete.headers.is_empty());
}

#[test]
fn path_level_parameter_and_placeholder_response() {
    let spec = petstore();
    let get = &spec.requests[2];
    assert_eq!(get.params[0].name, "petId");
    assert_eq!(get.params[0].value, "1");
    assert_eq!(get.params[0].description, "The id of the pet");

    let statuses: Vec<Option<&str>> = get
        .response_examples
        .iter()
        .map(|e| e.status.as_deref())
        .collect();
    assert_eq!(statuses, vec![Some("200"), Some("404")]);
    assert_eq!(
        get.response_examples[0].value,
        Some(json!({"name": "string", "tag": "string", "id": 0}))
    );
    assert_eq!(get.response_examples[1].content_type, None);
}

#[test]
fn header_cookie_and_undeclared_parameters() {
    let spec = petstore();
    let inventory = request(&spec, HttpMethod::Get, "/stores/{storeId}/inventory");
    assert_eq!(inventory.path, "/stores/{storeId}/inventory");
    assert_eq!(inventory.headers["X-Trace-Id"], "{{X-Trace-Id}}");
    assert_eq!(inventory.headers["Cookie"], "session={{session}}");
    let names: Vec<&str> = inventory.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["X-Trace-Id", "session", "storeId"]);
    assert!(inventory.params[2].is_prompt());
}

#[test]
fn petstore_environments() {
    let spec = petstore();
    let env = &spec.environments;
    assert!(env.found_valid_base_url);
    let names: Vec<&String> = env.public.sections.keys().collect();
    assert_eq!(names, vec!["dev", "dev2"]);

    let auth = &env.public.sections["dev2"].security.as_ref().unwrap().auth["petstore_auth"];
    assert_eq!(auth.grant_type, GrantType::AuthorizationCode);
    assert_eq!(
        auth.auth_url.as_deref(),
        Some("https://auth.petstore.example.com/authorize")
    );
    assert_eq!(auth.scope.as_deref(), Some("read:pets write:pets"));

    let private = serde_json::to_value(&env.private).unwrap();
    assert_eq!(
        private["dev"],
        json!({
            "Security": {"Auth": {"petstore_auth": {"Client Secret": "CHANGE_ME"}}},
            "APIKEYAUTH": "CHANGE_ME"
        })
    );

    let base: Vec<&str> = spec.base_urls.iter().map(|b| b.value.as_str()).collect();
    assert_eq!(
        base,
        vec![
            "https://petstore.example.com/v1",
            "https://staging.petstore.example.com/v1",
        ]
    );
}

#[test]
fn override_base_url_adds_trailing_section() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let options = GenerateOptions {
        base_url: Some("http://localhost:8080".to_string()),
        env_name: "dev".to_string(),
    };
    let generated = generate_with_options(&spec, &options).unwrap();
    let sections: Vec<(&str, Option<&str>)> = generated
        .environments
        .public
        .sections
        .iter()
        .map(|(name, s)| (name.as_str(), s.base_url.as_deref()))
        .collect();
    assert_eq!(
        sections,
        vec![
            ("dev", Some("https://petstore.example.com/v1")),
            ("dev2", Some("https://staging.petstore.example.com/v1")),
            ("dev3", Some("http://localhost:8080")),
        ]
    );
    assert_eq!(generated.base_urls[0].value, "http://localhost:8080");
}

#[test]
fn library_items_sample_and_queries() {
    let spec = library();
    let items = &spec.requests[0];
    assert_eq!(items.path, "/items\n?page={{page}}\n&sort={{sort}}\n&q={{q}}");
    let values: Vec<&str> = items.params.iter().map(|p| p.value.as_str()).collect();
    assert_eq!(values, vec!["3", "-created", ""]);

    let sample = items.response_examples[0].value.as_ref().unwrap();
    assert!(sample.is_object());
    assert!(sample["items"].is_array());
}

#[test]
fn library_first_alternative_only() {
    let spec = library();
    let loan = &spec.requests[1];
    assert_eq!(loan.base_path(), "/books/{{isbn}}/loans/{loanId}");
    assert_eq!(
        loan.headers["Authorization"],
        "Bearer {{$auth.token(\"machine\")}}"
    );
    let rendered = serde_json::to_string(loan).unwrap();
    assert!(!rendered.contains("BEARERAUTH"));

    let body = loan.body.as_ref().unwrap();
    assert_eq!(body["due"], json!("2024-01-01"));
    assert_eq!(body["member"]["email"], json!("user@example.com"));
    assert_eq!(loan.response_examples[0].value, Some(json!({"ok": true})));
}

#[test]
fn recursive_schema_degrades_to_null_example() {
    let spec = library();
    let tree = &spec.requests[2];
    assert_eq!(tree.response_examples.len(), 1);
    assert_eq!(tree.response_examples[0].value, None);
    assert_eq!(tree.diagnostics[0].kind, DiagnosticKind::SampleGeneration);
}

#[test]
fn library_environments() {
    let spec = library();
    let env = &spec.environments;
    assert!(!env.found_valid_base_url);
    assert!(spec.base_urls.is_empty());
    assert_eq!(env.public.sections["dev"].base_url.as_deref(), Some("/"));

    let auth = &env.public.sections["dev"].security.as_ref().unwrap().auth;
    assert_eq!(auth.len(), 1);
    assert_eq!(auth["machine"].grant_type, GrantType::ClientCredentials);
    assert_eq!(auth["machine"].auth_url, None);
    assert_eq!(auth["machine"].scope.as_deref(), Some("loans:read loans:write"));

    let vars: Vec<&String> = env.private.sections["dev"].variables.keys().collect();
    assert_eq!(
        vars,
        vec!["BASICAUTH_USERNAME", "BASICAUTH_PASSWORD", "BEARERAUTH_TOKEN"]
    );
    let public = serde_json::to_string(&env.public).unwrap();
    assert!(!public.contains("Client Secret"));
    assert!(!public.contains("BEARERAUTH_TOKEN"));

    assert!(env
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::SecuritySchemeUnresolvable && d.subject == "scheme missing"));
}

#[test]
fn generation_is_idempotent() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let first = serde_json::to_string(&generate(&spec).unwrap()).unwrap();
    let second = serde_json::to_string(&generate(&spec).unwrap()).unwrap();
    assert_eq!(first, second);
}
