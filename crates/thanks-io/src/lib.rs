//! `thanks-io` crate — a workflow node for the thanks.io direct-mail API.
//!
//! Exposes recipient creation and lookup as a configurable step, plus the
//! mailing list search that backs the recipient form's list picker.

pub mod config;
pub mod countries;
pub mod credentials;
pub mod description;
pub mod models;
pub mod node;
pub mod request;
pub mod search;

pub use config::ThanksIoConfig;
pub use node::ThanksIoNode;
pub use request::{RequestOverrides, ThanksIoClient};
