//! The node traits — the contract between a host and every node.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::credentials::Credentials;
use crate::parameters::NodeParameters;
use crate::schema::{CredentialDescription, NodeDescription};
use crate::NodeError;

/// Everything a node sees during one execution.
///
/// Built by the host per run; nodes read it and never mutate it.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Input items, in workflow order.
    pub items: Vec<Value>,
    /// Configured parameters of this node instance.
    pub parameters: NodeParameters,
    /// Decrypted credentials keyed by credential type name.
    pub credentials: Credentials,
    /// Keep going after a failed item, emitting an error item in its place.
    pub continue_on_fail: bool,
    /// Fired by the host to abort the run.
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            execution_id: uuid::Uuid::new_v4(),
            items,
            parameters: NodeParameters::default(),
            credentials: Credentials::default(),
            continue_on_fail: false,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: NodeParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Resolve a parameter for the item at `index`.
    pub fn parameter(&self, name: &str, index: usize) -> Option<Value> {
        self.parameters.get(name, index, &self.items)
    }

    pub fn parameter_or(&self, name: &str, index: usize, default: Value) -> Value {
        self.parameters.get_or(name, index, &self.items, default)
    }

    pub fn string_parameter(&self, name: &str, index: usize, default: &str) -> String {
        self.parameters.get_string(name, index, &self.items, default)
    }

    /// # Errors
    /// `NodeError::Cancelled` once the host has aborted the run.
    pub fn check_cancelled(&self) -> Result<(), NodeError> {
        if self.cancellation.is_cancelled() {
            Err(NodeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The core node trait.
///
/// `execute` receives the whole batch through the context and returns one
/// JSON output per processed item, in input order.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Parameter schema and metadata shown by the host.
    fn description(&self) -> &NodeDescription;

    /// Credential types this node can authenticate with.
    fn credential_types(&self) -> Vec<CredentialDescription>;

    async fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Value>, NodeError>;
}

/// Backs searchable list pickers in the parameter UI.
#[async_trait]
pub trait ListSearchNode: Send + Sync {
    /// Run the list-search method `method`, optionally narrowed by `filter`.
    async fn search(
        &self,
        method: &str,
        filter: Option<&str>,
        ctx: &ExecutionContext,
    ) -> Result<ListSearchResult, NodeError>;
}

/// Entries offered by a searchable list picker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSearchResult {
    pub results: Vec<ListSearchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSearchEntry {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
