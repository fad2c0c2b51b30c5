//! Node-level error type.

use thiserror::Error;

/// Errors returned by a node's `execute` and `search` methods.
///
/// The variant tells the host who is at fault:
/// - `Validation` — a parameter was malformed; nothing was sent.
/// - `Transport`  — the remote API failed or returned a non-success status.
/// - `Credential` — the host could not supply authentication material.
/// - `Item`       — any of the above, attributed to one input item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A parameter value could not be used as given.
    #[error("{0}")]
    Validation(String),

    /// Network failure or non-success HTTP status.
    #[error("{0}")]
    Transport(String),

    /// Missing or unusable credential.
    #[error("credential error: {0}")]
    Credential(String),

    /// The `resource` parameter names something this node does not handle.
    #[error("the resource '{0}' is not supported")]
    UnsupportedResource(String),

    /// The `operation` parameter is not valid for the selected resource.
    #[error("the operation '{operation}' is not supported for resource '{resource}'")]
    UnsupportedOperation {
        resource: String,
        operation: String,
    },

    /// The host aborted the execution.
    #[error("execution was cancelled")]
    Cancelled,

    /// An error raised while processing the item at `index`.
    #[error("{source} [item {index}]")]
    Item {
        index: usize,
        #[source]
        source: Box<NodeError>,
    },
}

impl NodeError {
    /// Attribute this error to the item at `index`.
    ///
    /// An error that already carries an index keeps it.
    pub fn at_item(self, index: usize) -> Self {
        match self {
            NodeError::Item { .. } | NodeError::Cancelled => self,
            other => NodeError::Item {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Index of the item this error is attributed to, if any.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            NodeError::Item { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The error with any item attribution stripped.
    pub fn cause(&self) -> &NodeError {
        match self {
            NodeError::Item { source, .. } => source.cause(),
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause(), NodeError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_item_wraps_once() {
        let err = NodeError::Validation("Invalid Mailing List ID".into())
            .at_item(3)
            .at_item(7);
        assert_eq!(err.item_index(), Some(3));
        assert_eq!(
            err.cause(),
            &NodeError::Validation("Invalid Mailing List ID".into())
        );
        assert_eq!(err.to_string(), "Invalid Mailing List ID [item 3]");
    }

    #[test]
    fn cancellation_is_never_attributed() {
        let err = NodeError::Cancelled.at_item(0);
        assert_eq!(err.item_index(), None);
        assert!(err.is_cancelled());
    }
}
