//! Translation of faux subtrees into [`lignin`] VDOM.
//!
//! Each translated node gets a [`MountHandle`] that keeps its `lignin` callback
//! registrations alive between passes, so a stable [`NodeId`] also yields stable
//! [`CallbackRef`]s and the differ can reuse existing listeners and elements.

use crate::{
	registry::{Event, Listeners},
	tree::{ElementData, FauxNode, NodeKind, Tree},
	FauxElement, NodeId,
};
use bumpalo::Bump;
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	pin::Pin,
};
use hashbrown::HashMap;
use lignin::{web, Attribute, CallbackRef, CallbackRegistration, DomRef, Element, ElementCreationOptions, EventBinding, EventBindingOptions, Materialize, Node, ReorderableFragment, ThreadBound};
use std::rc::{Rc, Weak};
use tracing::{error, instrument, trace, trace_span, warn};

/// Where a `lignin` callback lands.
struct Receiver {
	tree: Weak<RefCell<Tree>>,
	node: NodeId,
}
impl Receiver {
	fn pinned(tree: &Weak<RefCell<Tree>>, node: NodeId) -> Pin<Box<Self>> {
		Box::pin(Self { tree: Weak::clone(tree), node })
	}

	fn resolve(receiver: *const Self) -> Option<FauxElement> {
		let receiver = unsafe {
			//SAFETY: Each registration is dropped before the pinned receiver it points to (field order in `MountBinding` and `EventRegistration`).
			receiver.as_ref()
		}?;
		match receiver.tree.upgrade() {
			Some(tree) => Some(FauxElement::new(tree, receiver.node)),
			None => {
				warn!(node = %receiver.node, "Callback reached a dropped faux document. Ignoring.");
				None
			}
		}
	}

	fn rebind(receiver: *const Self, element: Option<web_sys::Element>) {
		let node = match Self::resolve(receiver) {
			Some(node) => node,
			None => return,
		};
		match element {
			Some(element) => node.attach_live(Rc::new(element)),
			None => node.detach_live(),
		}
	}

	fn dispatch(receiver: *const Self, event_type: &str, native: web_sys::Event) {
		if let Some(node) = Self::resolve(receiver) {
			let span = trace_span!("Dispatching", node = %node.node_id(), event_type);
			let _enter = span.enter();
			node.dispatch_event(&Event::with_native(event_type, native));
		}
	}
}

type HtmlBinding = fn(DomRef<&'_ web::HtmlElement>);
type SvgBinding = fn(DomRef<&'_ web::SvgElement>);
type MathMlBinding = fn(DomRef<&'_ web::Element>);

enum MountBinding {
	Html(CallbackRegistration<Receiver, HtmlBinding>, Pin<Box<Receiver>>),
	Svg(CallbackRegistration<Receiver, SvgBinding>, Pin<Box<Receiver>>),
	MathMl(CallbackRegistration<Receiver, MathMlBinding>, Pin<Box<Receiver>>),
}
impl MountBinding {
	fn new(tree: &Weak<RefCell<Tree>>, node: NodeId, namespace: Namespace) -> Self {
		let receiver = Receiver::pinned(tree, node);
		match namespace {
			Namespace::Html => Self::Html(
				CallbackRegistration::<_, HtmlBinding>::new(receiver.as_ref(), |receiver, dom_ref| {
					Receiver::rebind(
						receiver,
						match dom_ref {
							DomRef::Added(element) => {
								let element: &web_sys::HtmlElement = element.materialize();
								Some(element.clone().into())
							}
							DomRef::Removing(_) => None,
						},
					)
				}),
				receiver,
			),
			Namespace::Svg => Self::Svg(
				CallbackRegistration::<_, SvgBinding>::new(receiver.as_ref(), |receiver, dom_ref| {
					Receiver::rebind(
						receiver,
						match dom_ref {
							DomRef::Added(element) => {
								let element: &web_sys::SvgElement = element.materialize();
								Some(element.clone().into())
							}
							DomRef::Removing(_) => None,
						},
					)
				}),
				receiver,
			),
			Namespace::MathMl => Self::MathMl(
				CallbackRegistration::<_, MathMlBinding>::new(receiver.as_ref(), |receiver, dom_ref| {
					Receiver::rebind(
						receiver,
						match dom_ref {
							DomRef::Added(element) => {
								let element: &web_sys::Element = element.materialize();
								Some(element.clone())
							}
							DomRef::Removing(_) => None,
						},
					)
				}),
				receiver,
			),
		}
	}

	fn namespace(&self) -> Namespace {
		match self {
			Self::Html(..) => Namespace::Html,
			Self::Svg(..) => Namespace::Svg,
			Self::MathMl(..) => Namespace::MathMl,
		}
	}
}

struct EventRegistration(CallbackRegistration<Receiver, fn(web::Event)>, Pin<Box<Receiver>>);
impl EventRegistration {
	fn new(tree: &Weak<RefCell<Tree>>, node: NodeId, event_type: &str) -> Self {
		let receiver = Receiver::pinned(tree, node);
		// Handlers are plain `fn`s, so each event type needs its own trampoline.
		// The event type is recovered from the platform event instead.
		trace!(%node, event_type, "Registering event callback.");
		Self(
			CallbackRegistration::<_, fn(web::Event)>::new(receiver.as_ref(), |receiver, event| {
				let native: web_sys::Event = event.materialize();
				Receiver::dispatch(receiver, &native.type_(), native)
			}),
			receiver,
		)
	}
}

/// The lifecycle state a faux node gains once it has been translated.
#[derive(Default)]
pub(crate) struct MountHandle {
	hidden: bool,
	binding: Option<MountBinding>,
	events: HashMap<String, EventRegistration>,
}
impl MountHandle {
	/// Returns whether the handle was visible before.
	pub fn hide(&mut self) -> bool {
		!core::mem::replace(&mut self.hidden, true)
	}

	pub fn show(&mut self) {
		self.hidden = false
	}

	fn dom_binding(&mut self, tree: &Weak<RefCell<Tree>>, node: NodeId, namespace: Namespace) -> DomBinding {
		let binding = match self.binding.take() {
			Some(binding) if binding.namespace() == namespace => binding,
			_ => MountBinding::new(tree, node, namespace),
		};
		match self.binding.insert(binding) {
			MountBinding::Html(registration, _) => DomBinding::Html(registration.to_ref_thread_bound()),
			MountBinding::Svg(registration, _) => DomBinding::Svg(registration.to_ref_thread_bound()),
			MountBinding::MathMl(registration, _) => DomBinding::MathMl(registration.to_ref_thread_bound()),
		}
	}

	fn event_bindings<'a>(&mut self, tree: &Weak<RefCell<Tree>>, node: NodeId, listeners: &Listeners, bump: &'a Bump) -> &'a [EventBinding<'a, ThreadBound>] {
		self.events.retain(|event_type, _| listeners.contains(event_type));
		let bindings: Vec<_> = listeners
			.event_types()
			.map(|event_type| {
				let registration = self
					.events
					.entry(event_type.to_owned())
					.or_insert_with(|| EventRegistration::new(tree, node, event_type));
				EventBinding {
					name: bump.alloc_str(event_type),
					callback: registration.0.to_ref_thread_bound(),
					options: EventBindingOptions::new(),
				}
			})
			.collect();
		bump.alloc_slice_fill_iter(bindings)
	}
}
impl Debug for MountHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MountHandle")
			.field("hidden", &self.hidden)
			.field("binding", &self.binding.as_ref().map(MountBinding::namespace))
			.field("events", &self.events.keys().collect::<Vec<_>>())
			.finish()
	}
}

enum DomBinding {
	Html(CallbackRef<ThreadBound, HtmlBinding>),
	Svg(CallbackRef<ThreadBound, SvgBinding>),
	MathMl(CallbackRef<ThreadBound, MathMlBinding>),
}

/// Which `lignin` element variant a faux element renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
	Html,
	Svg,
	MathMl,
}
impl Namespace {
	/// The namespace of an element named `node_name` placed in a context of `self`.
	fn enter(self, node_name: &str) -> Self {
		match self {
			Self::Html if node_name.eq_ignore_ascii_case("svg") => Self::Svg,
			Self::Html if node_name.eq_ignore_ascii_case("math") => Self::MathMl,
			namespace => namespace,
		}
	}

	/// The context the children of an element named `node_name` in `self` are placed in.
	fn children(self, node_name: &str) -> Self {
		match self {
			Self::Svg if node_name == "foreignObject" => Self::Html,
			Self::MathMl if node_name == "annotation-xml" => Self::Html,
			namespace => namespace,
		}
	}

	/// The context `id` is placed in, derived from its ancestors.
	fn context(tree: &Tree, id: NodeId) -> Self {
		let mut ancestors = Vec::new();
		let mut current = tree.parent(id);
		while let Some(ancestor) = current {
			ancestors.push(ancestor);
			current = tree.parent(ancestor);
		}
		ancestors.into_iter().rev().fold(Self::Html, |context, ancestor| match tree.element(ancestor) {
			Some(element) => context.enter(&element.node_name).children(&element.node_name),
			None => context,
		})
	}
}

fn render_attributes<'a>(element: &ElementData, bump: &'a Bump) -> &'a [Attribute<'a>] {
	let mut attributes: Vec<_> = element
		.attributes
		.iter()
		.map(|(name, value)| Attribute {
			name: bump.alloc_str(name),
			value: bump.alloc_str(value),
		})
		.collect();
	if !element.style.is_empty() {
		attributes.push(Attribute {
			name: "style",
			value: bump.alloc_str(&element.style.css_text()),
		})
	}
	bump.alloc_slice_fill_iter(attributes)
}

fn translate<'a>(tree: &mut Tree, weak: &Weak<RefCell<Tree>>, id: NodeId, context: Namespace, bump: &'a Bump, depth_limit: usize) -> Node<'a, ThreadBound> {
	if depth_limit == 0 {
		error!(%id, "Depth limit reached");
		return Node::Multi(&[]);
	}

	let children = tree.children(id);
	let FauxNode { kind, mount, .. } = match tree.get_mut(id) {
		Some(node) => node,
		None => {
			warn!(%id, "Tried to render a released node. Rendering nothing.");
			return Node::Multi(&[]);
		}
	};

	let mount = mount.get_or_insert_with(MountHandle::default);
	if mount.hidden {
		trace!(%id, "Skipping hidden node.");
		return Node::Multi(&[]);
	}

	let element = match &*kind {
		NodeKind::Foreign(content) => {
			let span = trace_span!("Rendering foreign content", %id);
			let _enter = span.enter();
			return content.render(bump);
		}
		NodeKind::Element(element) => element,
	};

	let namespace = context.enter(&element.node_name);
	let span = trace_span!("Rendering element", %id, name = %element.node_name, ?namespace);
	let _enter = span.enter();

	let name: &'a str = match namespace {
		Namespace::Html => bump.alloc_str(&element.node_name.to_ascii_uppercase()),
		Namespace::Svg | Namespace::MathMl => bump.alloc_str(&element.node_name),
	};
	let attributes = render_attributes(element, bump);
	let event_bindings = mount.event_bindings(weak, id, &element.listeners, bump);
	let dom_binding = mount.dom_binding(weak, id, namespace);
	let text: Option<&'a str> = if element.text.is_empty() { None } else { Some(bump.alloc_str(&element.text)) };
	let children_context = namespace.children(&element.node_name);

	let content = match text {
		Some(text) => Node::Text { text, dom_binding: None },
		None => {
			let mut fragments = Vec::with_capacity(children.len());
			for child in children {
				fragments.push(ReorderableFragment {
					dom_key: child.get(),
					content: translate(tree, weak, child, children_context, bump, depth_limit - 1),
				});
			}
			Node::Keyed(bump.alloc_slice_fill_iter(fragments))
		}
	};

	let element = &*bump.alloc(Element {
		name,
		creation_options: ElementCreationOptions::new(),
		attributes,
		content,
		event_bindings,
	});
	match dom_binding {
		DomBinding::Html(binding) => Node::HtmlElement {
			element,
			dom_binding: Some(binding),
		},
		DomBinding::Svg(binding) => Node::SvgElement {
			element,
			dom_binding: Some(binding),
		},
		DomBinding::MathMl(binding) => Node::MathMlElement {
			element,
			dom_binding: Some(binding),
		},
	}
}

impl FauxElement {
	/// Translates this subtree into `lignin` VDOM allocated in `bump`.
	///
	/// Text content replaces child elements. Children are keyed by their [`NodeId`].
	/// Nodes hidden by [`unmount`](`FauxElement::unmount`) render as empty [`Node::Multi`].
	/// Beyond `depth_limit` levels, nothing is rendered and an error is logged.
	///
	/// The faux document is borrowed for the duration of the call, so
	/// [`ForeignContent::render`](`crate::ForeignContent::render`) must not access it.
	#[instrument(skip(bump))]
	pub fn to_vdom<'a>(&self, bump: &'a Bump, depth_limit: usize) -> Node<'a, ThreadBound> {
		let weak = Rc::downgrade(&self.tree);
		let mut tree = self.tree.borrow_mut();
		let context = Namespace::context(&tree, self.id);
		translate(&mut tree, &weak, self.id, context, bump, depth_limit)
	}
}
