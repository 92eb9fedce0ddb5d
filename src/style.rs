//! Inline style storage and the `CSSStyleDeclaration`-shaped handle over it.

use crate::{names, FauxElement};
use core::fmt::Write as _;
use indexmap::IndexMap;

/// Style declarations by canonical property name, in insertion order.
///
/// Values are stored and forwarded verbatim. Nothing here resolves the cascade.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Declarations(IndexMap<String, String>);
impl Declarations {
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(names::style_property(name).as_ref()).map(String::as_str)
	}

	/// Returns whether the stored value changed.
	pub fn set(&mut self, name: &str, value: &str) -> bool {
		let name = names::style_property(name);
		if self.0.get(name.as_ref()).map(String::as_str) == Some(value) {
			return false;
		}
		self.0.insert(name.into_owned(), value.to_owned());
		true
	}

	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.0.shift_remove(names::style_property(name).as_ref())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn name_at(&self, index: usize) -> Option<&str> {
		self.0.get_index(index).map(|(name, _)| name.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Serializes the declarations as inline CSS text.
	pub fn css_text(&self) -> String {
		let mut text = String::new();
		for (name, value) in self.iter() {
			if !text.is_empty() {
				text.push(' ');
			}
			// Writing into a `String` can't fail.
			let _ = write!(text, "{}: {};", name, value);
		}
		text
	}

	pub fn to_map(&self) -> IndexMap<String, String> {
		self.0.clone()
	}
}

/// A live view of a node's inline style, mimicking `CSSStyleDeclaration`.
///
/// Writes are mirrored onto the mounted element when the value changes.
#[derive(Debug, Clone)]
pub struct FauxStyle {
	element: FauxElement,
}
impl FauxStyle {
	pub(crate) fn new(element: FauxElement) -> Self {
		Self { element }
	}

	pub fn set_property(&self, name: &str, value: &str) {
		self.element.set_style_property(name, value)
	}

	/// Returns `""` for unset properties.
	#[must_use]
	pub fn get_property_value(&self, name: &str) -> String {
		self.element.style_property(name).unwrap_or_default()
	}

	/// Returns the removed value, or `""` if the property wasn't set.
	pub fn remove_property(&self, name: &str) -> String {
		self.element.remove_style_property(name).unwrap_or_default()
	}

	/// The number of set properties.
	#[must_use]
	pub fn length(&self) -> usize {
		self.element.with_declarations(Declarations::len).unwrap_or(0)
	}

	/// The canonical name of the `index`th set property.
	#[must_use]
	pub fn item(&self, index: usize) -> Option<String> {
		self.element.with_declarations(|declarations| declarations.name_at(index).map(str::to_owned)).flatten()
	}

	#[must_use]
	pub fn css_text(&self) -> String {
		self.element.with_declarations(Declarations::css_text).unwrap_or_default()
	}

	/// Like `setAttribute("style", …)`, this sets the listed properties and keeps all others.
	pub fn set_css_text(&self, text: &str) {
		self.element.set_attribute("style", text)
	}
}

/// The read-only style view returned by [`Window::get_computed_style`](`crate::Window::get_computed_style`).
///
/// Backed directly by the node's inline style. There is no cascade.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
	element: FauxElement,
}
impl ComputedStyle {
	pub(crate) fn new(element: FauxElement) -> Self {
		Self { element }
	}

	#[must_use]
	pub fn get_property_value(&self, name: &str) -> String {
		self.element.style_property(name).unwrap_or_default()
	}
}
