//! Credential types accepted by the thanks.io node.
//!
//! Both schemes end up as `Authorization: Bearer <token>`. The API key is
//! sent as-is; the OAuth2 variant only declares the fixed endpoints for the
//! host's shared authorization-code engine, which performs the exchange.

use nodes::credentials::OAUTH2_BASE;
use nodes::schema::{Authenticate, CredentialDescription, CredentialTest, NodeProperty, PropertyType};
use serde_json::{json, Value};

use crate::config::DEFAULT_BASE_URL;

pub const API_KEY_CREDENTIAL: &str = "thanksIoApi";
pub const OAUTH2_CREDENTIAL: &str = "thanksIoOAuth2Api";

/// Value of the `authentication` parameter selecting the API key.
pub const API_KEY_AUTHENTICATION: &str = "apiKey";
pub const OAUTH2_AUTHENTICATION: &str = "oAuth2";

pub const OAUTH_AUTHORIZE_URL: &str = "https://dashboard.thanks.io/oauth/authorize";
pub const OAUTH_TOKEN_URL: &str = "https://dashboard.thanks.io/oauth/token";

/// Personal access token, sent as a bearer header.
pub fn api_key_credential() -> CredentialDescription {
    CredentialDescription {
        name: API_KEY_CREDENTIAL.to_string(),
        display_name: "Thanks.io API".to_string(),
        documentation_url: "https://dashboard.thanks.io/profile/api".to_string(),
        extends: Vec::new(),
        properties: vec![NodeProperty::string("Personal Access Tokens (API Key)", "apiKey")
            .type_option("password", Value::Bool(true))
            .required()],
        authenticate: Some(Authenticate::BearerHeader {
            property: "apiKey".to_string(),
        }),
        test: Some(CredentialTest {
            method: "GET".to_string(),
            url: format!("{DEFAULT_BASE_URL}/ping"),
        }),
    }
}

/// Authorization-code OAuth2 against the thanks.io dashboard.
pub fn oauth2_credential() -> CredentialDescription {
    let hidden = |display: &str, name: &str, default: &str| {
        NodeProperty::new(display, name, PropertyType::Hidden, json!(default))
    };
    CredentialDescription {
        name: OAUTH2_CREDENTIAL.to_string(),
        display_name: "thanks.io OAuth2 API".to_string(),
        documentation_url: "https://docs.thanks.io/".to_string(),
        extends: vec![OAUTH2_BASE.to_string()],
        properties: vec![
            hidden("Grant Type", "grantType", "authorizationCode"),
            hidden("Authorization URL", "authUrl", OAUTH_AUTHORIZE_URL),
            hidden("Access Token URL", "accessTokenUrl", OAUTH_TOKEN_URL),
            hidden("Authentication", "authentication", "header"),
            hidden("Auth URI Query Parameters", "authQueryParameters", ""),
            hidden("Scope", "scope", ""),
        ],
        authenticate: None,
        test: None,
    }
}

/// Every credential type the node accepts.
pub fn credential_types() -> Vec<CredentialDescription> {
    vec![api_key_credential(), oauth2_credential()]
}

/// Credential selected by the `authentication` parameter.
pub fn credential_for(authentication: &str) -> CredentialDescription {
    if authentication == API_KEY_AUTHENTICATION {
        api_key_credential()
    } else {
        oauth2_credential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_of<'a>(description: &'a CredentialDescription, name: &str) -> &'a Value {
        &description
            .properties
            .iter()
            .find(|p| p.name == name)
            .expect("property declared")
            .default
    }

    #[test]
    fn api_key_is_tested_against_ping() {
        let credential = api_key_credential();
        let test = credential.test.expect("test request");
        assert_eq!(test.url, "https://api.thanks.io/api/v2/ping");
        assert_eq!(test.method, "GET");
        assert_eq!(
            credential.authenticate,
            Some(Authenticate::BearerHeader { property: "apiKey".into() })
        );
    }

    #[test]
    fn oauth2_declares_fixed_endpoints() {
        let credential = oauth2_credential();
        assert!(credential.extends(OAUTH2_BASE));
        assert_eq!(default_of(&credential, "grantType"), "authorizationCode");
        assert_eq!(default_of(&credential, "authUrl"), OAUTH_AUTHORIZE_URL);
        assert_eq!(default_of(&credential, "accessTokenUrl"), OAUTH_TOKEN_URL);
        assert_eq!(default_of(&credential, "authentication"), "header");
        assert_eq!(default_of(&credential, "scope"), "");
        assert_eq!(default_of(&credential, "authQueryParameters"), "");
    }

    #[test]
    fn authentication_parameter_selects_credential() {
        assert_eq!(credential_for("apiKey").name, API_KEY_CREDENTIAL);
        assert_eq!(credential_for(OAUTH2_AUTHENTICATION).name, OAUTH2_CREDENTIAL);
    }
}
