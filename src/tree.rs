//! The node arena.
//!
//! Nodes own their children through [`FauxNode::child_nodes`] and point back at their
//! parent by id only, so there are no reference cycles to manage.

use crate::{bridge::LiveElement, registry::{Attributes, Listeners}, render::MountHandle, style::Declarations, Error};
use bumpalo::Bump;
use core::{
	fmt::{self, Debug, Display, Formatter},
	num::NonZeroU32,
	sync::atomic::{AtomicU32, Ordering},
};
use hashbrown::HashMap;
use lignin::ThreadBound;
use std::rc::Rc;
use tracing::{error, trace, warn};

/// `Node.ELEMENT_NODE`
pub const ELEMENT_NODE: u16 = 1;

/// The process-unique identity of a faux node.
///
/// Ids are never reused, which makes them usable as reconciliation keys.
/// They are also the `dom_key`s of rendered children, so they share [`lignin`]'s `u32` key width.
///
/// # Panics
///
/// Creating a node panics once all `u32::MAX - 1` ids have been handed out,
/// since handing out any further id would reuse one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NonZeroU32);
impl NodeId {
	fn next() -> Self {
		static NEXT: AtomicU32 = AtomicU32::new(1);
		Self::take(&NEXT).unwrap_or_else(|| {
			error!("Ran out of node ids.");
			panic!("`NodeId`s exhausted")
		})
	}

	/// Takes the counter's current value and advances it, or returns [`None`] without advancing once it can't.
	fn take(counter: &AtomicU32) -> Option<Self> {
		counter
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
			.ok()
			.and_then(NonZeroU32::new)
			.map(Self)
	}

	#[must_use]
	pub fn get(self) -> u32 {
		self.0.get()
	}
}
impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Content managed outside the faux DOM, rendered verbatim where its node sits.
///
/// Foreign nodes take part in traversal and rendering, but have no attributes, styles,
/// listeners or children and never match selectors.
pub trait ForeignContent: Debug {
	fn render<'a>(&self, bump: &'a Bump) -> lignin::Node<'a, ThreadBound>;
}

#[derive(Debug)]
pub(crate) struct ElementData {
	pub node_type: u16,
	pub node_name: String,
	pub attributes: Attributes,
	pub style: Declarations,
	pub listeners: Listeners,
	pub text: String,
}
impl ElementData {
	fn new(node_name: String) -> Self {
		Self {
			node_type: ELEMENT_NODE,
			node_name,
			attributes: Attributes::new(),
			style: Declarations::default(),
			listeners: Listeners::default(),
			text: String::new(),
		}
	}
}

#[derive(Debug)]
pub(crate) enum NodeKind {
	Element(ElementData),
	Foreign(Rc<dyn ForeignContent>),
}

pub(crate) struct FauxNode {
	pub parent: Option<NodeId>,
	pub child_nodes: Vec<NodeId>,
	pub kind: NodeKind,
	pub live: Option<Rc<dyn LiveElement>>,
	pub mount: Option<MountHandle>,
}
impl FauxNode {
	fn new(kind: NodeKind) -> Self {
		Self {
			parent: None,
			child_nodes: Vec::new(),
			kind,
			live: None,
			mount: None,
		}
	}

	pub fn element(&self) -> Option<&ElementData> {
		match &self.kind {
			NodeKind::Element(element) => Some(element),
			NodeKind::Foreign(_) => None,
		}
	}

	pub fn element_mut(&mut self) -> Option<&mut ElementData> {
		match &mut self.kind {
			NodeKind::Element(element) => Some(element),
			NodeKind::Foreign(_) => None,
		}
	}

	/// Whether [`Tree::children`] lists this node.
	fn is_child_element(&self) -> bool {
		match &self.kind {
			NodeKind::Element(element) => element.node_type == ELEMENT_NODE,
			NodeKind::Foreign(_) => true,
		}
	}
}
impl Debug for FauxNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("FauxNode")
			.field("parent", &self.parent)
			.field("child_nodes", &self.child_nodes)
			.field("kind", &self.kind)
			.field("live", &self.live.is_some())
			.field("mount", &self.mount)
			.finish()
	}
}

#[derive(Default)]
pub(crate) struct Tree {
	nodes: HashMap<NodeId, FauxNode>,
	pub invalidate: Option<Rc<dyn Fn()>>,
}
impl Debug for Tree {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Tree").field("nodes", &self.nodes.len()).field("invalidate", &self.invalidate.is_some()).finish()
	}
}
impl Tree {
	pub fn create_element(&mut self, node_name: &str) -> NodeId {
		self.insert(FauxNode::new(NodeKind::Element(ElementData::new(node_name.to_owned()))))
	}

	pub fn create_foreign(&mut self, content: Rc<dyn ForeignContent>) -> NodeId {
		self.insert(FauxNode::new(NodeKind::Foreign(content)))
	}

	fn insert(&mut self, node: FauxNode) -> NodeId {
		let id = NodeId::next();
		self.nodes.insert(id, node);
		trace!(%id, "Created faux node.");
		id
	}

	pub fn get(&self, id: NodeId) -> Option<&FauxNode> {
		self.nodes.get(&id)
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut FauxNode> {
		self.nodes.get_mut(&id)
	}

	pub fn element(&self, id: NodeId) -> Option<&ElementData> {
		self.get(id).and_then(FauxNode::element)
	}

	pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
		self.get_mut(id).and_then(FauxNode::element_mut)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.get(id).and_then(|node| node.parent)
	}

	pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
		self.get(id).map(|node| node.child_nodes.as_slice()).unwrap_or(&[])
	}

	/// Element children plus foreign nodes, which always count as content.
	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		self.child_nodes(id)
			.iter()
			.copied()
			.filter(|&child| self.get(child).map_or(false, FauxNode::is_child_element))
			.collect()
	}

	/// The neighbour at `offset` within the parent's [`children`](`Tree::children`).
	pub fn sibling(&self, id: NodeId, offset: isize) -> Option<NodeId> {
		let siblings = self.children(self.parent(id)?);
		let index = siblings.iter().position(|&sibling| sibling == id)?;
		let index = if offset < 0 { index.checked_sub(offset.unsigned_abs())? } else { index + offset.unsigned_abs() };
		siblings.get(index).copied()
	}

	pub fn root(&self, mut id: NodeId) -> NodeId {
		while let Some(parent) = self.parent(id) {
			id = parent;
		}
		id
	}

	/// Whether `ancestor` is a proper ancestor of `node`, walking parent links up from `node`.
	pub fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		while let Some(parent) = self.parent(node) {
			if parent == ancestor {
				return true;
			}
			node = parent;
		}
		false
	}

	/// `root` and all its descendants in document order.
	pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
		let mut order = Vec::new();
		let mut stack = vec![root];
		while let Some(id) = stack.pop() {
			order.push(id);
			stack.extend(self.child_nodes(id).iter().rev().copied());
		}
		order
	}

	fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
		match self.get(parent) {
			None => {
				warn!(%parent, "Tried to insert into a released node. Ignoring.");
				false
			}
			Some(FauxNode { kind: NodeKind::Foreign(_), .. }) => {
				warn!(%parent, %child, "Foreign nodes can't have children. Ignoring.");
				false
			}
			Some(_) if !self.contains(child) => {
				warn!(%child, "Tried to insert a released node. Ignoring.");
				false
			}
			Some(_) if parent == child || self.is_ancestor(child, parent) => {
				warn!(%parent, %child, "Refusing to insert a node into its own subtree.");
				false
			}
			Some(_) => true,
		}
	}

	/// Unlinks `id` from its parent, if any.
	fn detach(&mut self, id: NodeId) {
		let parent = match self.get_mut(id).and_then(|node| node.parent.take()) {
			Some(parent) => parent,
			None => return,
		};
		if let Some(parent) = self.get_mut(parent) {
			parent.child_nodes.retain(|&child| child != id);
		}
	}

	fn adopt(&mut self, parent: NodeId, child: NodeId) {
		if let Some(node) = self.get_mut(child) {
			node.parent = Some(parent);
			if let Some(mount) = node.mount.as_mut() {
				mount.show();
			}
		}
	}

	/// Returns `false` if the insertion was refused.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
		self.insert_before(parent, child, None)
	}

	/// Inserts `child` before `reference`, or at the end if `reference` isn't a child of `parent`.
	///
	/// Returns `false` if the insertion was refused.
	pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> bool {
		if !self.can_adopt(parent, child) {
			return false;
		}

		// Inserting a node before itself keeps it in place.
		let reference = match reference {
			Some(reference) if reference == child => self.child_nodes(parent).iter().skip_while(|&&c| c != child).nth(1).copied(),
			reference => reference,
		};

		self.detach(child);
		self.adopt(parent, child);
		if let Some(node) = self.get_mut(parent) {
			match reference.and_then(|reference| node.child_nodes.iter().position(|&c| c == reference)) {
				Some(index) => node.child_nodes.insert(index, child),
				None => node.child_nodes.push(child),
			}
		}
		true
	}

	pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
		let node = self.get_mut(parent).ok_or(Error::NotAChild { parent, child })?;
		let index = node.child_nodes.iter().position(|&c| c == child).ok_or(Error::NotAChild { parent, child })?;
		node.child_nodes.remove(index);
		if let Some(child) = self.get_mut(child) {
			child.parent = None;
		}
		Ok(())
	}

	/// Hides the node's mount handle and drops its live binding.
	///
	/// Returns whether a mounted node was hidden, in which case the host should rerender.
	pub fn unmount(&mut self, id: NodeId) -> bool {
		let node = match self.get_mut(id) {
			Some(node) => node,
			None => return false,
		};
		node.live = None;
		node.mount.as_mut().map_or(false, MountHandle::hide)
	}

	/// Copies `id` into a new parentless node. Listeners are not copied.
	pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Option<NodeId> {
		let kind = match &self.get(id)?.kind {
			NodeKind::Element(element) => NodeKind::Element(ElementData {
				node_type: element.node_type,
				node_name: element.node_name.clone(),
				attributes: element.attributes.clone(),
				style: element.style.clone(),
				listeners: Listeners::default(),
				text: if deep { element.text.clone() } else { String::new() },
			}),
			NodeKind::Foreign(content) => NodeKind::Foreign(Rc::clone(content)),
		};
		let clone = self.insert(FauxNode::new(kind));

		if deep {
			for child in self.child_nodes(id).to_vec() {
				if let Some(child_clone) = self.clone_node(child, true) {
					self.adopt(clone, child_clone);
					if let Some(node) = self.get_mut(clone) {
						node.child_nodes.push(child_clone);
					}
				}
			}
		}
		Some(clone)
	}

	/// Frees a detached subtree. Returns the number of freed nodes.
	pub fn release(&mut self, id: NodeId) -> usize {
		if let Some(parent) = self.parent(id) {
			warn!(%id, %parent, "Refusing to release an attached node.");
			return 0;
		}
		let subtree = self.preorder(id);
		subtree.into_iter().filter(|id| self.nodes.remove(id).is_some()).count()
	}
}
