use crate::NodeId;
use thiserror::Error;

/// The few ways a faux DOM call can fail.
///
/// Everything not listed here is total: reads of unset names come back empty and
/// malformed mutations are logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
	/// `querySelector`/`querySelectorAll` was called with an empty selector.
	#[error("not enough arguments: the selector is empty")]
	EmptySelector,

	/// The selector could not be parsed.
	#[error("invalid selector {selector:?}: {reason}")]
	InvalidSelector { selector: String, reason: &'static str },

	/// `removeChild` was called with a node that isn't a child of the receiver.
	#[error("node {child} is not a child of node {parent}")]
	NotAChild { parent: NodeId, child: NodeId },
}
