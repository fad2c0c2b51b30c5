//! Authenticated HTTP helper shared by every node.
//!
//! A node builds [`HttpRequestOptions`] and names the credential type to use;
//! the helper attaches the credential, sends the request and decodes the
//! response. There is no retry, caching or rate limiting here.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::debug;

use crate::credentials::{bearer_token, CredentialData};
use crate::schema::CredentialDescription;
use crate::traits::ExecutionContext;
use crate::NodeError;

/// One outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequestOptions {
    pub method: Method,
    pub url: String,
    /// Query parameters; `null` values are dropped.
    pub query: Map<String, Value>,
    /// JSON body; `None` sends no body at all.
    pub body: Option<Value>,
    /// Return non-2xx responses as values instead of failing.
    pub ignore_http_status_errors: bool,
    pub timeout: Option<Duration>,
}

impl Default for HttpRequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: String::new(),
            query: Map::new(),
            body: None,
            ignore_http_status_errors: false,
            timeout: None,
        }
    }
}

/// Sends requests on behalf of nodes.
#[derive(Debug, Clone, Default)]
pub struct RequestHelper {
    client: Client,
}

impl RequestHelper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Send `options` authenticated with the stored `description` credential.
    ///
    /// The request is abandoned as soon as the execution is cancelled.
    ///
    /// # Errors
    /// `Credential` when no usable credential is stored, `Transport` on
    /// network failure or non-success status, `Cancelled` on abort.
    pub async fn request_with_authentication(
        &self,
        ctx: &ExecutionContext,
        description: &CredentialDescription,
        options: HttpRequestOptions,
    ) -> Result<Value, NodeError> {
        let data = ctx.credentials.get(&description.name)?;
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(NodeError::Cancelled),
            result = self.send(description, data, options) => result,
        }
    }

    /// Issue the credential's test request; succeeds only on a 2xx status.
    ///
    /// # Errors
    /// `Credential` if the description has no test or no usable token,
    /// `Transport` if the remote rejects it.
    pub async fn test_credential(
        &self,
        description: &CredentialDescription,
        data: &CredentialData,
    ) -> Result<(), NodeError> {
        let test = description.test.as_ref().ok_or_else(|| {
            NodeError::Credential(format!("'{}' has no test request", description.name))
        })?;
        let method = Method::from_bytes(test.method.as_bytes())
            .map_err(|e| NodeError::Credential(format!("invalid test method: {e}")))?;
        self.send(
            description,
            data,
            HttpRequestOptions {
                method,
                url: test.url.clone(),
                ..Default::default()
            },
        )
        .await
        .map(|_| ())
    }

    async fn send(
        &self,
        description: &CredentialDescription,
        data: &CredentialData,
        options: HttpRequestOptions,
    ) -> Result<Value, NodeError> {
        let token = bearer_token(description, data)?;

        let query: Vec<(String, String)> = options
            .query
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), query_value(v)))
            .collect();

        let mut builder = self
            .client
            .request(options.method.clone(), &options.url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NodeError::Transport(e.to_string()))?;
        let status = response.status();
        debug!(method = %options.method, url = %options.url, status = status.as_u16(), "request completed");

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NodeError::Transport(e.to_string()))?;
        let body = decode_body(&bytes);

        if !status.is_success() && !options.ignore_http_status_errors {
            return Err(NodeError::Transport(status_message(status.as_u16(), &body)));
        }
        Ok(body)
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON when possible, text otherwise, `null` when empty.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn status_message(status: u16, body: &Value) -> String {
    let detail = match body {
        Value::Null => None,
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    };
    match detail {
        Some(detail) => format!("Request failed with status code {status}: {detail}"),
        None => format!("Request failed with status code {status}"),
    }
}
