//! Selection policies, kept apart from the resolvers that apply them.

use crate::ir::GrantType;
use crate::parse::operation::Operation;
use crate::parse::security::{OAuthFlow, OAuthFlows, SecurityRequirement};

/// Picks the one alternative to apply out of an OR-list of requirements.
pub type SecuritySelector = fn(&[SecurityRequirement]) -> Option<&SecurityRequirement>;

/// Picks the one OAuth2 flow to describe in the environment files.
pub type FlowSelector = fn(&OAuthFlows) -> Option<(GrantType, &OAuthFlow)>;

/// Flow preference used by [`preferred_flow`].
pub const FLOW_PREFERENCE: [GrantType; 5] = [
    GrantType::AuthorizationCode,
    GrantType::ClientCredentials,
    GrantType::Password,
    GrantType::Implicit,
    GrantType::DeviceAuthorization,
];

/// The first alternative wins.
pub fn first_alternative(requirements: &[SecurityRequirement]) -> Option<&SecurityRequirement> {
    requirements.first()
}

/// The first declared flow in [`FLOW_PREFERENCE`] order.
pub fn preferred_flow(flows: &OAuthFlows) -> Option<(GrantType, &OAuthFlow)> {
    FLOW_PREFERENCE
        .into_iter()
        .find_map(|grant| flow_for(flows, grant).map(|flow| (grant, flow)))
}

pub fn flow_for(flows: &OAuthFlows, grant: GrantType) -> Option<&OAuthFlow> {
    match grant {
        GrantType::AuthorizationCode => flows.authorization_code.as_ref(),
        GrantType::ClientCredentials => flows.client_credentials.as_ref(),
        GrantType::Password => flows.password.as_ref(),
        GrantType::Implicit => flows.implicit.as_ref(),
        GrantType::DeviceAuthorization => flows.device_authorization.as_ref(),
    }
}

/// The operation's own requirement when declared (an empty list disables
/// security), otherwise the document's.
pub fn effective_requirement<'a>(
    operation: &'a Operation,
    root: Option<&'a [SecurityRequirement]>,
) -> &'a [SecurityRequirement] {
    match &operation.security {
        Some(own) => own,
        None => root.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(token_url: &str) -> OAuthFlow {
        OAuthFlow {
            token_url: Some(token_url.into()),
            ..OAuthFlow::default()
        }
    }

    #[test]
    fn test_preferred_flow_order() {
        let flows = OAuthFlows {
            implicit: Some(OAuthFlow::default()),
            password: Some(flow("https://a/token")),
            client_credentials: Some(flow("https://b/token")),
            ..OAuthFlows::default()
        };
        let (grant, chosen) = preferred_flow(&flows).unwrap();
        assert_eq!(grant, GrantType::ClientCredentials);
        assert_eq!(chosen.token_url.as_deref(), Some("https://b/token"));
        assert!(preferred_flow(&OAuthFlows::default()).is_none());
    }

    #[test]
    fn test_effective_requirement() {
        let root: Vec<SecurityRequirement> =
            serde_yaml_ng::from_str("[{ApiKeyAuth: []}]").unwrap();
        let inherit: Operation = serde_yaml_ng::from_str("responses: {}").unwrap();
        let disabled: Operation = serde_yaml_ng::from_str("security: []").unwrap();
        assert_eq!(effective_requirement(&inherit, Some(root.as_slice())).len(), 1);
        assert!(effective_requirement(&disabled, Some(root.as_slice())).is_empty());
        assert!(effective_requirement(&inherit, None).is_empty());
    }
}
