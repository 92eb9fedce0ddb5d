//! The DOM-shaped node handle that imperative code mutates and queries.

use crate::{
	bridge::{LiveElement, Rect},
	loggable, names, position, query,
	registry::{Attributes, Event, Listener},
	style::{Declarations, FauxStyle},
	tree::{ElementData, NodeKind, Tree},
	Document, DocumentPosition, Error, NodeId,
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	hash::{Hash, Hasher},
};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::{trace, warn};

/// `Attr`, as returned by [`FauxElement::get_attribute_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
	/// The canonical attribute name.
	pub name: String,
	pub value: String,
	/// Always `true`.
	pub specified: bool,
}

/// A handle to a node in a faux [`Document`].
///
/// Handles are cheap to clone and compare by identity.
/// Each call borrows the document only for its own duration, so listeners may mutate the tree freely.
///
/// Once the node is [released](`Document::release`), reads through the handle come back empty and mutations are logged and ignored.
#[derive(Clone)]
pub struct FauxElement {
	pub(crate) tree: Rc<RefCell<Tree>>,
	pub(crate) id: NodeId,
}

fn is_style(name: &str) -> bool {
	names::attribute(name) == "style"
}

impl FauxElement {
	pub(crate) fn new(tree: Rc<RefCell<Tree>>, id: NodeId) -> Self {
		Self { tree, id }
	}

	fn handle(&self, id: NodeId) -> Self {
		Self::new(Rc::clone(&self.tree), id)
	}

	fn handles(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<Self> {
		ids.into_iter().map(|id| self.handle(id)).collect()
	}

	fn same_document(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.tree, &other.tree)
	}

	fn read<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
		self.tree.borrow().element(self.id).map(f)
	}

	/// Runs `f` on the element data and hands back its result with the current live binding.
	fn update<R>(&self, action: &str, f: impl FnOnce(&mut ElementData) -> R) -> Option<(R, Option<Rc<dyn LiveElement>>)> {
		let mut tree = self.tree.borrow_mut();
		let node = match tree.get_mut(self.id) {
			Some(node) => node,
			None => {
				warn!(node = %self.id, "Tried to {} on a released node. Ignoring.", action);
				return None;
			}
		};
		let live = node.live.clone();
		match node.element_mut() {
			Some(element) => Some((f(element), live)),
			None => {
				warn!(node = %self.id, "Tried to {} on a foreign node. Ignoring.", action);
				None
			}
		}
	}

	#[must_use]
	pub fn node_id(&self) -> NodeId {
		self.id
	}

	/// `None` for foreign and released nodes.
	#[must_use]
	pub fn node_type(&self) -> Option<u16> {
		self.read(|element| element.node_type)
	}

	/// The name as passed to [`Document::create_element`], or `""` for foreign nodes.
	#[must_use]
	pub fn node_name(&self) -> String {
		self.read(|element| element.node_name.clone()).unwrap_or_default()
	}

	#[must_use]
	pub fn is_foreign(&self) -> bool {
		matches!(self.tree.borrow().get(self.id).map(|node| &node.kind), Some(NodeKind::Foreign(_)))
	}

	#[must_use]
	pub fn owner_document(&self) -> Document {
		Document::from_tree(Rc::clone(&self.tree))
	}

	#[must_use]
	pub fn parent_node(&self) -> Option<Self> {
		let parent = self.tree.borrow().parent(self.id)?;
		Some(self.handle(parent))
	}

	/// All child nodes, including ones [`children`](`FauxElement::children`) filters out.
	#[must_use]
	pub fn child_nodes(&self) -> Vec<Self> {
		let child_nodes = self.tree.borrow().child_nodes(self.id).to_vec();
		self.handles(child_nodes)
	}

	/// Element children plus foreign nodes.
	#[must_use]
	pub fn children(&self) -> Vec<Self> {
		let children = self.tree.borrow().children(self.id);
		self.handles(children)
	}

	#[must_use]
	pub fn first_child(&self) -> Option<Self> {
		let first = self.tree.borrow().child_nodes(self.id).first().copied()?;
		Some(self.handle(first))
	}

	#[must_use]
	pub fn last_child(&self) -> Option<Self> {
		let last = self.tree.borrow().child_nodes(self.id).last().copied()?;
		Some(self.handle(last))
	}

	/// The following entry in the parent's [`children`](`FauxElement::children`).
	#[must_use]
	pub fn next_sibling(&self) -> Option<Self> {
		let sibling = self.tree.borrow().sibling(self.id, 1)?;
		Some(self.handle(sibling))
	}

	/// The preceding entry in the parent's [`children`](`FauxElement::children`).
	#[must_use]
	pub fn previous_sibling(&self) -> Option<Self> {
		let sibling = self.tree.borrow().sibling(self.id, -1)?;
		Some(self.handle(sibling))
	}

	/// Sets an attribute, or with `name` `"style"` each declaration in `value`.
	///
	/// A bound live element is only written to if the stored value changed.
	pub fn set_attribute(&self, name: &str, value: &str) {
		if is_style(name) {
			for (property, value) in names::parse_style_text(value) {
				self.set_style_property(property, value)
			}
			return;
		}

		let name = names::attribute(name);
		let changed = self.update("set an attribute", |element| {
			if element.attributes.get(name.as_ref()).map(String::as_str) == Some(value) {
				return false;
			}
			element.attributes.insert(name.to_string(), value.to_owned());
			true
		});
		if let Some((true, live)) = changed {
			trace!(node = %self.id, %name, value = loggable(value), "Set attribute.");
			if let Some(live) = live {
				live.set_attribute(&name, value)
			}
		}
	}

	pub fn set_attribute_ns(&self, _namespace: Option<&str>, name: &str, value: &str) {
		self.set_attribute(name, value)
	}

	/// For `"style"`, this is the serialized inline style (if any properties are set).
	#[must_use]
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		if is_style(name) {
			return self.read(|element| element.style.css_text()).filter(|text| !text.is_empty());
		}
		let name = names::attribute(name);
		self.read(|element| element.attributes.get(name.as_ref()).cloned()).flatten()
	}

	#[must_use]
	pub fn get_attribute_ns(&self, _namespace: Option<&str>, name: &str) -> Option<String> {
		self.get_attribute(name)
	}

	#[must_use]
	pub fn get_attribute_node(&self, name: &str) -> Option<Attr> {
		self.get_attribute(name).map(|value| Attr {
			name: names::attribute(name).into_owned(),
			value,
			specified: true,
		})
	}

	#[must_use]
	pub fn get_attribute_node_ns(&self, _namespace: Option<&str>, name: &str) -> Option<Attr> {
		self.get_attribute_node(name)
	}

	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	/// Removing `"style"` clears the whole inline style.
	pub fn remove_attribute(&self, name: &str) {
		if is_style(name) {
			if let Some((true, live)) = self.update("remove the style attribute", |element| !core::mem::take(&mut element.style).is_empty()) {
				trace!(node = %self.id, "Cleared inline style.");
				if let Some(live) = live {
					live.remove_attribute("style")
				}
			}
			return;
		}

		let name = names::attribute(name);
		if let Some((Some(_), live)) = self.update("remove an attribute", |element| element.attributes.shift_remove(name.as_ref())) {
			trace!(node = %self.id, %name, "Removed attribute.");
			if let Some(live) = live {
				live.remove_attribute(&name)
			}
		}
	}

	pub fn remove_attribute_ns(&self, _namespace: Option<&str>, name: &str) {
		self.remove_attribute(name)
	}

	/// A snapshot of all attributes except `style`, in insertion order.
	#[must_use]
	pub fn attributes(&self) -> Attributes {
		self.read(|element| element.attributes.clone()).unwrap_or_default()
	}

	#[must_use]
	pub fn style(&self) -> FauxStyle {
		FauxStyle::new(self.clone())
	}

	/// A snapshot of the inline style by canonical property name, in insertion order.
	#[must_use]
	pub fn style_snapshot(&self) -> IndexMap<String, String> {
		self.read(|element| element.style.to_map()).unwrap_or_default()
	}

	/// A blank `value` removes the property instead.
	pub(crate) fn set_style_property(&self, name: &str, value: &str) {
		if value.trim().is_empty() {
			self.remove_style_property(name);
			return;
		}
		let name = names::style_property(name);
		if let Some((true, live)) = self.update("set a style property", |element| element.style.set(&name, value)) {
			trace!(node = %self.id, %name, value = loggable(value), "Set style property.");
			if let Some(live) = live {
				live.set_style_property(&name, value)
			}
		}
	}

	pub(crate) fn style_property(&self, name: &str) -> Option<String> {
		self.read(|element| element.style.get(name).map(str::to_owned)).flatten()
	}

	pub(crate) fn remove_style_property(&self, name: &str) -> Option<String> {
		let name = names::style_property(name);
		match self.update("remove a style property", |element| element.style.remove(&name)) {
			Some((Some(removed), live)) => {
				trace!(node = %self.id, %name, "Removed style property.");
				if let Some(live) = live {
					live.remove_style_property(&name)
				}
				Some(removed)
			}
			_ => None,
		}
	}

	pub(crate) fn with_declarations<R>(&self, f: impl FnOnce(&Declarations) -> R) -> Option<R> {
		self.read(|element| f(&element.style))
	}

	/// Registers `listener` for `event_type`, in any accepted spelling (`"click"`, `"onClick"`).
	///
	/// Event types the node had no listeners for before are bound on the next render pass.
	pub fn add_event_listener(&self, event_type: &str, listener: Listener) {
		self.update("add an event listener", |element| element.listeners.add(event_type, listener));
	}

	/// Removes one registration of this exact `listener`. Unknown listeners are ignored.
	pub fn remove_event_listener(&self, event_type: &str, listener: &Listener) {
		self.update("remove an event listener", |element| element.listeners.remove(event_type, listener));
	}

	/// Calls each listener for the event's type in registration order, with this node as receiver.
	///
	/// Returns whether any listener ran.
	pub fn dispatch_event(&self, event: &Event) -> bool {
		let listeners = self.read(|element| element.listeners.snapshot(event.event_type())).unwrap_or_default();
		trace!(node = %self.id, event_type = event.event_type(), count = listeners.len(), "Dispatching event.");
		for listener in &listeners {
			listener.call(self, event)
		}
		!listeners.is_empty()
	}

	/// Moves `child` to the end of this node's child list and returns it.
	///
	/// Insertions that would create a cycle are logged and ignored.
	#[allow(clippy::must_use_candidate)]
	pub fn append_child(&self, child: &Self) -> Self {
		self.insert_before(child, None)
	}

	/// Moves `node` in front of `reference`, or to the end if `reference` isn't a child of this node.
	#[allow(clippy::must_use_candidate)]
	pub fn insert_before(&self, node: &Self, reference: Option<&Self>) -> Self {
		if self.same_document(node) {
			let reference = reference.filter(|reference| self.same_document(reference)).map(|reference| reference.id);
			self.tree.borrow_mut().insert_before(self.id, node.id, reference);
		} else {
			warn!(parent = %self.id, child = %node.id, "Tried to insert a node from another document. Ignoring.");
		}
		node.clone()
	}

	/// Detaches `child` and [unmounts](`FauxElement::unmount`) it.
	///
	/// # Errors
	///
	/// Iff `child` is not a child of this node, in which case nothing changes.
	pub fn remove_child(&self, child: &Self) -> Result<Self, Error> {
		if !self.same_document(child) {
			return Err(Error::NotAChild { parent: self.id, child: child.id });
		}
		self.tree.borrow_mut().remove_child(self.id, child.id)?;
		trace!(parent = %self.id, child = %child.id, "Removed child.");
		child.unmount();
		Ok(child.clone())
	}

	/// Copies this node into a new parentless one. Listeners are never copied.
	///
	/// A deep clone also copies the text and all descendants.
	/// `None` iff this node was released.
	#[must_use]
	pub fn clone_node(&self, deep: bool) -> Option<Self> {
		let clone = self.tree.borrow_mut().clone_node(self.id, deep)?;
		Some(self.handle(clone))
	}

	/// Hides this node's rendered output and drops its live binding.
	///
	/// If the node was mounted, the document's [invalidation hook](`Document::on_invalidate`) runs afterwards.
	pub fn unmount(&self) {
		let invalidate = {
			let mut tree = self.tree.borrow_mut();
			if tree.unmount(self.id) {
				tree.invalidate.clone()
			} else {
				None
			}
		};
		if let Some(invalidate) = invalidate {
			trace!(node = %self.id, "Unmounted. Invalidating.");
			invalidate()
		}
	}

	/// Matching descendants in document order.
	///
	/// # Errors
	///
	/// Iff `selector` is empty or can't be parsed.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>, Error> {
		let found = query::select_all(&self.tree.borrow(), self.id, selector)?;
		Ok(self.handles(found))
	}

	/// The first of [`query_selector_all`](`FauxElement::query_selector_all`).
	///
	/// # Errors
	///
	/// Iff `selector` is empty or can't be parsed.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Self>, Error> {
		let found = query::select_first(&self.tree.borrow(), self.id, selector)?;
		Ok(found.map(|id| self.handle(id)))
	}

	/// Descendant elements named exactly `name` (or all of them for `"*"`), in document order.
	#[must_use]
	pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<Self> {
		let found = query::by_tag_name(&self.tree.borrow(), self.id, name);
		self.handles(found)
	}

	#[must_use]
	pub fn get_elements_by_tag_name_ns(&self, _namespace: Option<&str>, name: &str) -> Vec<Self> {
		self.get_elements_by_tag_name(name)
	}

	/// The shallowest descendant with this `id`. Ties at the same depth go to the left-most one.
	#[must_use]
	pub fn get_element_by_id(&self, id: &str) -> Option<Self> {
		let found = query::by_id(&self.tree.borrow(), self.id, id)?;
		Some(self.handle(found))
	}

	/// Only available while a live element is bound.
	#[must_use]
	pub fn get_bounding_client_rect(&self) -> Option<Rect> {
		let live = self.tree.borrow().get(self.id)?.live.clone()?;
		live.bounding_client_rect()
	}

	#[must_use]
	pub fn compare_document_position(&self, other: &Self) -> DocumentPosition {
		if !self.same_document(other) {
			return DocumentPosition::DISCONNECTED;
		}
		position::compare(&self.tree.borrow(), self.id, other.id)
	}

	/// The node's text. There is no markup parsing, so this is the same as [`text_content`](`FauxElement::text_content`).
	#[must_use]
	pub fn inner_html(&self) -> String {
		self.text_content()
	}

	pub fn set_inner_html(&self, text: &str) {
		self.set_text_content(text)
	}

	#[must_use]
	pub fn text_content(&self) -> String {
		self.read(|element| element.text.clone()).unwrap_or_default()
	}

	/// Non-empty text replaces the node's children when rendering.
	pub fn set_text_content(&self, text: &str) {
		self.update("set text", |element| {
			element.text.clear();
			element.text.push_str(text)
		});
	}

	/// Binds a mounted counterpart, replacing any previous one.
	///
	/// Rendered nodes are bound automatically. This is for adapters that mount elsewhere.
	pub fn attach_live(&self, live: Rc<dyn LiveElement>) {
		match self.tree.borrow_mut().get_mut(self.id) {
			Some(node) => {
				trace!(node = %self.id, "Bound live element.");
				node.live = Some(live)
			}
			None => warn!(node = %self.id, "Tried to bind a live element to a released node. Ignoring."),
		}
	}

	pub fn detach_live(&self) {
		if let Some(node) = self.tree.borrow_mut().get_mut(self.id) {
			if node.live.take().is_some() {
				trace!(node = %self.id, "Unbound live element.");
			}
		}
	}

	#[must_use]
	pub fn is_live(&self) -> bool {
		self.tree.borrow().get(self.id).map_or(false, |node| node.live.is_some())
	}
}

impl PartialEq for FauxElement {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && self.same_document(other)
	}
}
impl Eq for FauxElement {}
impl Hash for FauxElement {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state)
	}
}

impl Debug for FauxElement {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let name = self.tree.try_borrow().ok().and_then(|tree| tree.element(self.id).map(|element| element.node_name.clone()));
		f.debug_struct("FauxElement").field("id", &self.id).field("name", &name).finish()
	}
}
