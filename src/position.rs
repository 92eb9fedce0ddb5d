//! `Node.compareDocumentPosition`

use crate::{tree::Tree, NodeId};
use bitflags::bitflags;

bitflags! {
	/// The standard document position bitmask.
	///
	/// An empty set means both operands are the same node.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct DocumentPosition: u16 {
		const DISCONNECTED = 0x01;
		const PRECEDING = 0x02;
		const FOLLOWING = 0x04;
		const CONTAINS = 0x08;
		const CONTAINED_BY = 0x10;
		const IMPLEMENTATION_SPECIFIC = 0x20;
	}
}

/// Where `other` sits relative to `this`.
pub(crate) fn compare(tree: &Tree, this: NodeId, other: NodeId) -> DocumentPosition {
	if this == other {
		return DocumentPosition::empty();
	}

	let root = tree.root(this);
	if !tree.contains(this) || !tree.contains(other) || root != tree.root(other) {
		return DocumentPosition::DISCONNECTED;
	}

	if tree.is_ancestor(this, other) {
		return DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING;
	}
	if tree.is_ancestor(other, this) {
		return DocumentPosition::CONTAINS | DocumentPosition::PRECEDING;
	}

	match tree.preorder(root).into_iter().find(|&id| id == this || id == other) {
		Some(first) if first == this => DocumentPosition::FOLLOWING,
		Some(_) => DocumentPosition::PRECEDING,
		None => DocumentPosition::DISCONNECTED,
	}
}
