use indexmap::IndexMap;
use serde::Serialize;

use super::types::Diagnostic;
use crate::error::EnvValidationError;

pub const PUBLIC_ENV_SCHEMA_URL: &str = "https://raw.githubusercontent.com/mistweaverco/kulala.nvim/main/schemas/http-client.env.schema.json";
pub const PRIVATE_ENV_SCHEMA_URL: &str = "https://raw.githubusercontent.com/mistweaverco/kulala.nvim/main/schemas/http-client.private.env.schema.json";

/// Value written wherever the user has to supply a real value.
pub const PLACEHOLDER: &str = "CHANGE_ME";

/// OAuth2 grant type, serialized with the env file labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GrantType {
    #[serde(rename = "Authorization Code")]
    AuthorizationCode,
    #[serde(rename = "Client Credentials")]
    ClientCredentials,
    #[serde(rename = "Password")]
    Password,
    #[serde(rename = "Implicit")]
    Implicit,
    #[serde(rename = "Device Authorization")]
    DeviceAuthorization,
}

impl GrantType {
    pub fn label(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "Authorization Code",
            GrantType::ClientCredentials => "Client Credentials",
            GrantType::Password => "Password",
            GrantType::Implicit => "Implicit",
            GrantType::DeviceAuthorization => "Device Authorization",
        }
    }
}

/// An env file: `$schema` followed by named sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvTree<A> {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(flatten)]
    pub sections: IndexMap<String, EnvSection<A>>,
}

impl<A> EnvTree<A> {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            sections: IndexMap::new(),
        }
    }
}

pub type PublicEnv = EnvTree<PublicOAuth2Auth>;
pub type PrivateEnv = EnvTree<PrivateAuth>;

/// One named environment, e.g. `dev`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvSection<A> {
    #[serde(rename = "BASE_URL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "$default_headers", skip_serializing_if = "Option::is_none")]
    pub default_headers: Option<IndexMap<String, String>>,
    #[serde(rename = "Security", skip_serializing_if = "Option::is_none")]
    pub security: Option<Security<A>>,
    #[serde(flatten)]
    pub variables: IndexMap<String, serde_json::Value>,
}

impl<A> Default for EnvSection<A> {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: None,
            security: None,
            variables: IndexMap::new(),
        }
    }
}

impl<A> EnvSection<A> {
    /// Checks variable keys and value kinds.
    pub fn validate(&self) -> Result<(), EnvValidationError> {
        for (key, value) in &self.variables {
            if !is_valid_variable_key(key) {
                return Err(EnvValidationError::InvalidVariableKey(key.clone()));
            }
            if !(value.is_string() || value.is_number() || value.is_object()) {
                return Err(EnvValidationError::InvalidVariableValue(key.clone()));
            }
        }
        Ok(())
    }
}

/// `Security.Auth`, keyed by scheme name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Security<A> {
    #[serde(rename = "Auth")]
    pub auth: IndexMap<String, A>,
}

/// Non-secret OAuth2 settings, safe to commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicOAuth2Auth {
    #[serde(rename = "Type")]
    pub auth_type: String,
    #[serde(rename = "Grant Type")]
    pub grant_type: GrantType,
    #[serde(rename = "Client ID")]
    pub client_id: String,
    #[serde(rename = "Auth URL", skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(rename = "Token URL", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(rename = "Device Auth URL", skip_serializing_if = "Option::is_none")]
    pub device_auth_url: Option<String>,
    #[serde(rename = "Scope", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl PublicOAuth2Auth {
    pub fn new(grant_type: GrantType) -> Self {
        Self {
            auth_type: "OAuth2".to_string(),
            grant_type,
            client_id: PLACEHOLDER.to_string(),
            auth_url: None,
            token_url: None,
            device_auth_url: None,
            scope: None,
        }
    }

    /// Checks the fields each grant type needs and that every URL is http(s).
    pub fn validate(&self) -> Result<(), EnvValidationError> {
        let grant = self.grant_type.label();
        let required: &[(&'static str, &Option<String>)] = match self.grant_type {
            GrantType::AuthorizationCode => &[
                ("Auth URL", &self.auth_url),
                ("Token URL", &self.token_url),
            ],
            GrantType::ClientCredentials | GrantType::Password => {
                &[("Token URL", &self.token_url)]
            }
            GrantType::Implicit => &[("Auth URL", &self.auth_url)],
            GrantType::DeviceAuthorization => &[
                ("Device Auth URL", &self.device_auth_url),
                ("Token URL", &self.token_url),
            ],
        };
        for &(field, value) in required {
            if value.is_none() {
                return Err(EnvValidationError::MissingField {
                    grant_type: grant,
                    field,
                });
            }
        }

        if self.client_id.trim().is_empty() {
            return Err(EnvValidationError::Empty { field: "Client ID" });
        }

        let urls = [
            ("Auth URL", &self.auth_url),
            ("Token URL", &self.token_url),
            ("Device Auth URL", &self.device_auth_url),
        ];
        for (field, value) in urls {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(EnvValidationError::Empty { field });
                }
                if !is_http_url(value) {
                    return Err(EnvValidationError::InvalidUrl {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// OAuth2 secrets, kept out of the public env file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrivateAuth {
    #[serde(rename = "Client Secret", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(rename = "Username", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl PrivateAuth {
    pub fn is_empty(&self) -> bool {
        self.client_secret.is_none() && self.username.is_none() && self.password.is_none()
    }

    pub fn validate(&self) -> Result<(), EnvValidationError> {
        let fields = [
            ("Client Secret", &self.client_secret),
            ("Username", &self.username),
            ("Password", &self.password),
        ];
        for (field, value) in fields {
            if value.as_deref().is_some_and(|v| v.is_empty()) {
                return Err(EnvValidationError::Empty { field });
            }
        }
        Ok(())
    }
}

/// Output of the environment builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentBuild {
    pub public: PublicEnv,
    pub private: PrivateEnv,
    /// `false` when every base URL was trivial (`""`, `"/"` or blank).
    pub found_valid_base_url: bool,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn is_valid_variable_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
