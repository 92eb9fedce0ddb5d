//! The faux `document` and `window`.

use crate::{style::ComputedStyle, tree::Tree, DocumentPosition, FauxElement, ForeignContent};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::trace;

/// Owns a faux node arena and creates nodes in it.
///
/// Clones share the same arena. All nodes are freed once the last `Document` clone and
/// [`FauxElement`] handle are gone, or earlier through [`Document::release`].
#[derive(Clone, Default)]
pub struct Document {
	tree: Rc<RefCell<Tree>>,
}

impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn from_tree(tree: Rc<RefCell<Tree>>) -> Self {
		Self { tree }
	}

	/// # Panics
	///
	/// Iff the process has run out of [`NodeId`](`crate::NodeId`)s.
	#[must_use]
	pub fn create_element(&self, name: &str) -> FauxElement {
		let id = self.tree.borrow_mut().create_element(name);
		FauxElement::new(Rc::clone(&self.tree), id)
	}

	/// The namespace is ignored. It's inferred from the `svg` and `math` ancestors when rendering.
	#[must_use]
	pub fn create_element_ns(&self, _namespace: Option<&str>, name: &str) -> FauxElement {
		self.create_element(name)
	}

	/// Creates a node that renders `content` as-is.
	#[must_use]
	pub fn create_foreign(&self, content: Rc<dyn ForeignContent>) -> FauxElement {
		let id = self.tree.borrow_mut().create_foreign(content);
		FauxElement::new(Rc::clone(&self.tree), id)
	}

	/// Every node counts as part of the document, so this is always [`DocumentPosition::CONTAINS`].
	#[must_use]
	pub fn compare_document_position(&self, _other: &FauxElement) -> DocumentPosition {
		DocumentPosition::CONTAINS
	}

	#[must_use]
	pub fn default_view(&self) -> Window {
		Window { document: self.clone() }
	}

	/// Sets the callback that runs after a mounted node was [unmounted](`FauxElement::unmount`).
	///
	/// Adapters use this to schedule a render pass.
	pub fn on_invalidate(&self, hook: impl 'static + Fn()) {
		self.tree.borrow_mut().invalidate = Some(Rc::new(hook))
	}

	/// Frees `element` and its descendants, if it is detached. Returns the number of freed nodes.
	///
	/// Remaining handles to freed nodes become inert.
	#[allow(clippy::must_use_candidate)]
	pub fn release(&self, element: &FauxElement) -> usize {
		if !Rc::ptr_eq(&self.tree, &element.tree) {
			return 0;
		}
		let freed = self.tree.borrow_mut().release(element.id);
		trace!(root = %element.id, freed, "Released subtree.");
		freed
	}

	/// The number of nodes currently allocated in this document.
	#[must_use]
	pub fn node_count(&self) -> usize {
		self.tree.borrow().len()
	}
}

impl PartialEq for Document {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.tree, &other.tree)
	}
}
impl Eq for Document {}

impl Debug for Document {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Document").field(&self.tree.try_borrow().map(|tree| tree.len()).ok()).finish()
	}
}

/// The faux `window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
	document: Document,
}

impl Window {
	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Reads from `element`'s inline style only. There is no cascade.
	#[must_use]
	pub fn get_computed_style(&self, element: &FauxElement) -> ComputedStyle {
		ComputedStyle::new(element.clone())
	}
}
