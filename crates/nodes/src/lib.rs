//! `nodes` crate — the host contract every node is written against.
//!
//! Every node implements [`ExecutableNode`] (and [`ListSearchNode`] when it
//! backs searchable pickers). The host supplies an [`ExecutionContext`] with
//! items, parameters, credentials and a cancellation token; the node answers
//! with JSON output items or an item-indexed [`NodeError`].

pub mod credentials;
pub mod error;
pub mod http;
pub mod parameters;
pub mod schema;
pub mod traits;

pub use credentials::{CredentialData, Credentials};
pub use error::NodeError;
pub use http::{HttpRequestOptions, RequestHelper};
pub use parameters::NodeParameters;
pub use traits::{ExecutableNode, ExecutionContext, ListSearchEntry, ListSearchNode, ListSearchResult};
