//! Per-node attribute and event listener registries.

use crate::{names, FauxElement};
use core::fmt::{self, Debug, Formatter};
use indexmap::IndexMap;
use std::rc::Rc;

/// Attribute values by canonical attribute name, in insertion order.
pub type Attributes = IndexMap<String, String>;

/// A typed event listener handle.
///
/// Listeners are compared by identity: [`FauxElement::remove_event_listener`] removes a
/// registration made with a clone of the same `Listener`, never one made from an
/// equivalent closure.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&FauxElement, &Event)>);
impl Listener {
	pub fn new(handler: impl 'static + Fn(&FauxElement, &Event)) -> Self {
		Self(Rc::new(handler))
	}

	pub(crate) fn call(&self, this: &FauxElement, event: &Event) {
		(self.0)(this, event)
	}
}
impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}
}
impl Eq for Listener {}
impl Debug for Listener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Listener").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// The event a [`Listener`] receives.
///
/// When dispatched by the mounted page, the platform event is available through [`Event::native`].
#[derive(Debug, Clone)]
pub struct Event {
	event_type: String,
	native: Option<web_sys::Event>,
}
impl Event {
	/// Creates a synthetic event without a platform counterpart.
	#[must_use]
	pub fn new(event_type: &str) -> Self {
		Self {
			event_type: names::event(event_type).into_owned(),
			native: None,
		}
	}

	pub(crate) fn with_native(event_type: &str, native: web_sys::Event) -> Self {
		Self {
			event_type: names::event(event_type).into_owned(),
			native: Some(native),
		}
	}

	/// The canonical event type, like `"click"`.
	#[must_use]
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	#[must_use]
	pub fn native(&self) -> Option<&web_sys::Event> {
		self.native.as_ref()
	}
}

/// Ordered listener lists by canonical event type.
///
/// Event types without listeners are dropped, so iteration only yields live bindings.
#[derive(Debug, Default, Clone)]
pub(crate) struct Listeners(IndexMap<String, Vec<Listener>>);
impl Listeners {
	pub fn add(&mut self, event_type: &str, listener: Listener) {
		self.0.entry(names::event(event_type).into_owned()).or_default().push(listener)
	}

	/// Removes the first registration of `listener` for `event_type`.
	pub fn remove(&mut self, event_type: &str, listener: &Listener) -> bool {
		let event_type = names::event(event_type);
		let listeners = match self.0.get_mut(event_type.as_ref()) {
			Some(listeners) => listeners,
			None => return false,
		};
		let index = match listeners.iter().position(|registered| registered == listener) {
			Some(index) => index,
			None => return false,
		};
		listeners.remove(index);
		if listeners.is_empty() {
			self.0.shift_remove(event_type.as_ref());
		}
		true
	}

	/// A snapshot of the listeners for `event_type`, in registration order.
	pub fn snapshot(&self, event_type: &str) -> Vec<Listener> {
		self.0.get(names::event(event_type).as_ref()).cloned().unwrap_or_default()
	}

	/// Whether `event_type` (already canonical) has listeners.
	pub fn contains(&self, event_type: &str) -> bool {
		self.0.contains_key(event_type)
	}

	pub fn event_types(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
