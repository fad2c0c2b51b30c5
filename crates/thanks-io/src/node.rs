//! The thanks.io node.
//!
//! `execute` walks the input items strictly in order:
//! 1. `resource` is read once, from item 0.
//! 2. `operation` and every value field are read per item, so expressions
//!    can vary the request across the batch.
//! 3. One request is sent per item and its decoded body becomes the item's
//!    output.
//! 4. A failure is tagged with the item index and aborts the run, unless
//!    the host enabled continue-on-fail, in which case an `{"error": ...}`
//!    item takes its place.

use async_trait::async_trait;
use nodes::schema::{CredentialDescription, NodeDescription};
use nodes::{ExecutableNode, ExecutionContext, ListSearchNode, ListSearchResult, NodeError, RequestHelper};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument, warn};

use crate::config::ThanksIoConfig;
use crate::countries::is_known_country;
use crate::credentials::credential_types;
use crate::description::{node_description, SEARCH_MAILING_LISTS};
use crate::models::{
    AdditionalFields, MailingListId, Operation, RecipientCreateRequest, Resource, DEFAULT_COUNTRY,
};
use crate::request::{RequestOverrides, ThanksIoClient};
use crate::search::search_mailing_lists;

pub struct ThanksIoNode {
    description: NodeDescription,
    client: ThanksIoClient,
}

impl Default for ThanksIoNode {
    fn default() -> Self {
        Self::new(ThanksIoConfig::default())
    }
}

impl ThanksIoNode {
    pub fn new(config: ThanksIoConfig) -> Self {
        Self::with_client(ThanksIoClient::new(config, RequestHelper::default()))
    }

    pub fn with_client(client: ThanksIoClient) -> Self {
        Self {
            description: node_description(),
            client,
        }
    }

    async fn process_item(
        &self,
        ctx: &ExecutionContext,
        resource: Resource,
        index: usize,
    ) -> Result<Value, NodeError> {
        let operation = ctx.string_parameter("operation", index, "");
        match Operation::parse(resource, &operation)? {
            Operation::Create => self.create_recipient(ctx, index).await,
            Operation::Get => self.get_recipient(ctx, index).await,
        }
    }

    async fn create_recipient(&self, ctx: &ExecutionContext, index: usize) -> Result<Value, NodeError> {
        let mailing_list_id =
            MailingListId::parse(ctx.parameter_or("mailing_list_id", index, Value::Null))?.resolve()?;

        let request = RecipientCreateRequest {
            mailing_list_id,
            name: ctx.string_parameter("name", index, ""),
            address: ctx.string_parameter("address", index, ""),
            address2: ctx.string_parameter("address2", index, ""),
            city: ctx.string_parameter("city", index, ""),
            province: ctx.string_parameter("province", index, ""),
            postal_code: ctx.string_parameter("postal_code", index, ""),
            country: ctx.string_parameter("country", index, DEFAULT_COUNTRY),
        };
        if !request.country.is_empty() && !is_known_country(&request.country) {
            warn!(index, country = %request.country, "country is not an ISO 3166 code");
        }

        let additional: AdditionalFields =
            serde_json::from_value(ctx.parameter_or("additionalFields", index, json!({})))
                .map_err(|e| NodeError::Validation(format!("Invalid additional fields: {e}")))?;

        let body = request.into_body(&additional)?;
        self.client
            .request(ctx, Method::POST, "/recipients", body, Map::new(), RequestOverrides::default())
            .await
    }

    async fn get_recipient(&self, ctx: &ExecutionContext, index: usize) -> Result<Value, NodeError> {
        let recipient_id = recipient_id(ctx.parameter("recipientId", index))?;
        self.client
            .request(
                ctx,
                Method::GET,
                &format!("/recipients/{recipient_id}"),
                Map::new(),
                Map::new(),
                RequestOverrides::default(),
            )
            .await
    }
}

fn recipient_id(value: Option<Value>) -> Result<i64, NodeError> {
    let id = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| NodeError::Validation("Invalid Recipient ID".to_string()))
}

#[async_trait]
impl ExecutableNode for ThanksIoNode {
    fn description(&self) -> &NodeDescription {
        &self.description
    }

    fn credential_types(&self) -> Vec<CredentialDescription> {
        credential_types()
    }

    #[instrument(skip(self, ctx), fields(execution_id = %ctx.execution_id, items = ctx.items.len()))]
    async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Value>, NodeError> {
        let resource = ctx
            .string_parameter("resource", 0, Resource::Recipient.as_str())
            .parse::<Resource>();
        let mut output = Vec::with_capacity(ctx.items.len());

        for index in 0..ctx.items.len() {
            ctx.check_cancelled()?;

            let result = match &resource {
                Ok(resource) => self.process_item(ctx, *resource, index).await,
                Err(e) => Err(e.clone()),
            };

            match result {
                Ok(json) => {
                    info!(index, "item processed");
                    output.push(json);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) if ctx.continue_on_fail => {
                    warn!(index, error = %e, "item failed, continuing");
                    output.push(json!({ "error": e.to_string() }));
                }
                Err(e) => {
                    let e = e.at_item(index);
                    error!(error = %e, "execution aborted");
                    return Err(e);
                }
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl ListSearchNode for ThanksIoNode {
    async fn search(
        &self,
        method: &str,
        filter: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Result<ListSearchResult, NodeError> {
        match method {
            SEARCH_MAILING_LISTS => search_mailing_lists(&self.client, ctx, filter).await,
            other => Err(NodeError::Validation(format!("unknown list search method '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_id_accepts_numbers_and_numeric_text() {
        assert_eq!(recipient_id(Some(json!(999))), Ok(999));
        assert_eq!(recipient_id(Some(json!(" 12 "))), Ok(12));
        assert_eq!(recipient_id(Some(json!(999.0))), Ok(999));
        assert!(recipient_id(Some(json!(999.5))).is_err());
        assert!(recipient_id(Some(json!("twelve"))).is_err());
        assert!(recipient_id(None).is_err());
    }
}
