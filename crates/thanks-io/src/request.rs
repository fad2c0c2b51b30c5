//! Request dispatcher for the thanks.io API.

use nodes::{ExecutionContext, HttpRequestOptions, NodeError, RequestHelper};
use reqwest::Method;
use serde_json::{Map, Value};

use crate::config::ThanksIoConfig;
use crate::credentials::{credential_for, API_KEY_AUTHENTICATION};

/// Per-call replacements for the computed request defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub method: Option<Method>,
    pub url: Option<String>,
    /// `Some(None)` forces no body even when one was given.
    pub body: Option<Option<Value>>,
    pub query: Option<Map<String, Value>>,
    pub ignore_http_status_errors: Option<bool>,
}

/// Sends authenticated requests to `<base_url><path>`.
#[derive(Debug, Clone, Default)]
pub struct ThanksIoClient {
    config: ThanksIoConfig,
    helper: RequestHelper,
}

impl ThanksIoClient {
    pub fn new(config: ThanksIoConfig, helper: RequestHelper) -> Self {
        Self { config, helper }
    }

    /// Build and send one request with the active credential attached.
    ///
    /// An empty `body` object means no body. The credential is chosen from
    /// the `authentication` parameter on every call.
    ///
    /// # Errors
    /// Whatever the request helper reports; nothing is retried.
    pub async fn request(
        &self,
        ctx: &ExecutionContext,
        method: Method,
        path: &str,
        body: Map<String, Value>,
        query: Map<String, Value>,
        overrides: RequestOverrides,
    ) -> Result<Value, NodeError> {
        let authentication = ctx.string_parameter("authentication", 0, API_KEY_AUTHENTICATION);
        let credential = credential_for(&authentication);
        let options = self.options(method, path, body, query, overrides);
        self.helper
            .request_with_authentication(ctx, &credential, options)
            .await
    }

    fn options(
        &self,
        method: Method,
        path: &str,
        body: Map<String, Value>,
        query: Map<String, Value>,
        overrides: RequestOverrides,
    ) -> HttpRequestOptions {
        let body = (!body.is_empty()).then_some(Value::Object(body));
        HttpRequestOptions {
            method: overrides.method.unwrap_or(method),
            url: overrides.url.unwrap_or_else(|| self.config.url(path)),
            query: overrides.query.unwrap_or(query),
            body: overrides.body.unwrap_or(body),
            ignore_http_status_errors: overrides.ignore_http_status_errors.unwrap_or(false),
            timeout: Some(self.config.timeout),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_body_is_omitted() {
        let client = ThanksIoClient::default();
        let options = client.options(Method::GET, "/recipients/1", Map::new(), Map::new(), RequestOverrides::default());
        assert_eq!(options.body, None);
        assert_eq!(options.url, "https://api.thanks.io/api/v2/recipients/1");
        assert!(!options.ignore_http_status_errors);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let client = ThanksIoClient::default();
        let options = client.options(
            Method::POST,
            "/recipients",
            object(json!({ "name": "Jane" })),
            Map::new(),
            RequestOverrides {
                method: Some(Method::PUT),
                body: Some(None),
                query: Some(object(json!({ "page": 2 }))),
                ignore_http_status_errors: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(options.method, Method::PUT);
        assert_eq!(options.body, None);
        assert_eq!(options.query["page"], 2);
        assert!(options.ignore_http_status_errors);
    }
}
