//! Credential storage as seen by a node.
//!
//! The host owns the vault; a node only receives decrypted data keyed by
//! credential type name and never writes it back.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::schema::{Authenticate, CredentialDescription};
use crate::NodeError;

/// Base type name of the generic OAuth2 credential.
pub const OAUTH2_BASE: &str = "oAuth2Api";

/// Decrypted data of one credential.
#[derive(Clone, Default, PartialEq)]
pub struct CredentialData(Map<String, Value>);

impl CredentialData {
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.0.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A non-empty string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Access token the host obtained through the OAuth2 flow.
    pub fn oauth_access_token(&self) -> Option<&str> {
        self.0
            .get("oauthTokenData")
            .and_then(|t| t.get("access_token"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

// Secrets must never reach a log line.
impl fmt::Debug for CredentialData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialData")
            .field("fields", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Credentials available to one execution, keyed by credential type name.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    entries: HashMap<String, CredentialData>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, credential_type: impl Into<String>, data: CredentialData) {
        self.entries.insert(credential_type.into(), data);
    }

    pub fn with(mut self, credential_type: impl Into<String>, data: CredentialData) -> Self {
        self.insert(credential_type, data);
        self
    }

    /// # Errors
    /// `NodeError::Credential` when nothing is stored for `credential_type`.
    pub fn get(&self, credential_type: &str) -> Result<&CredentialData, NodeError> {
        self.entries.get(credential_type).ok_or_else(|| {
            NodeError::Credential(format!("no credentials set for '{credential_type}'"))
        })
    }
}

/// Bearer token to send for `data`, following the description's rule.
///
/// OAuth2-derived types use the host-issued access token; other types use
/// their declared `authenticate` rule.
///
/// # Errors
/// `NodeError::Credential` when the token field is missing or empty.
pub fn bearer_token<'a>(
    description: &CredentialDescription,
    data: &'a CredentialData,
) -> Result<&'a str, NodeError> {
    if description.extends(OAUTH2_BASE) {
        return data.oauth_access_token().ok_or_else(|| {
            NodeError::Credential(format!(
                "'{}' has no access token; connect the account first",
                description.name
            ))
        });
    }

    match &description.authenticate {
        Some(Authenticate::BearerHeader { property }) => data.get_str(property).ok_or_else(|| {
            NodeError::Credential(format!("'{}' is missing '{property}'", description.name))
        }),
        None => Err(NodeError::Credential(format!(
            "'{}' does not declare how to authenticate",
            description.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_key_description() -> CredentialDescription {
        CredentialDescription {
            name: "exampleApi".into(),
            display_name: "Example API".into(),
            documentation_url: String::new(),
            extends: vec![],
            properties: vec![],
            authenticate: Some(Authenticate::BearerHeader { property: "apiKey".into() }),
            test: None,
        }
    }

    #[test]
    fn bearer_token_reads_declared_property() {
        let data = CredentialData::default().with("apiKey", json!("secret"));
        assert_eq!(bearer_token(&api_key_description(), &data).unwrap(), "secret");
    }

    #[test]
    fn empty_api_key_is_a_credential_error() {
        let data = CredentialData::default().with("apiKey", json!(""));
        assert!(matches!(
            bearer_token(&api_key_description(), &data),
            Err(NodeError::Credential(_))
        ));
    }

    #[test]
    fn oauth2_types_use_the_access_token() {
        let mut description = api_key_description();
        description.extends = vec![OAUTH2_BASE.into()];
        description.authenticate = None;
        let data = CredentialData::default()
            .with("oauthTokenData", json!({ "access_token": "tok-123" }));
        assert_eq!(bearer_token(&description, &data).unwrap(), "tok-123");
    }

    #[test]
    fn debug_output_hides_values() {
        let data = CredentialData::default().with("apiKey", json!("secret"));
        let printed = format!("{data:?}");
        assert!(printed.contains("apiKey"));
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn missing_credential_type_is_reported() {
        let creds = Credentials::new();
        assert!(matches!(creds.get("exampleApi"), Err(NodeError::Credential(_))));
    }
}
