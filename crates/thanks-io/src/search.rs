//! Mailing list search backing the `mailing_list_id` picker.

use nodes::{ExecutionContext, ListSearchEntry, ListSearchResult, NodeError};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::MailingListPage;
use crate::request::{RequestOverrides, ThanksIoClient};

/// Query `GET /mailing-lists` and shape the records for the picker.
///
/// Every call hits the API; a blank filter sends no `query` parameter.
///
/// # Errors
/// Transport failures, or a response that is not a mailing list page.
pub async fn search_mailing_lists(
    client: &ThanksIoClient,
    ctx: &ExecutionContext,
    filter: Option<&str>,
) -> Result<ListSearchResult, NodeError> {
    let mut query = Map::new();
    if let Some(text) = filter.filter(|t| !t.trim().is_empty()) {
        query.insert("query".to_string(), Value::String(text.to_string()));
    }

    let response = client
        .request(ctx, Method::GET, "/mailing-lists", Map::new(), query, RequestOverrides::default())
        .await?;
    let page: MailingListPage = serde_json::from_value(response)
        .map_err(|e| NodeError::Transport(format!("unexpected mailing list response: {e}")))?;
    debug!(count = page.data.len(), "mailing lists fetched");

    Ok(ListSearchResult {
        results: page.data.into_iter().map(ListSearchEntry::from).collect(),
    })
}
