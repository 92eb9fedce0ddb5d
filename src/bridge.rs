//! Writes faux mutations through to mounted elements.

use core::fmt::Debug;
use tracing::error;
use wasm_bindgen::JsCast;

/// A bounding rectangle, as reported by `Element.getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

/// The mounted counterpart of a faux node.
///
/// While a faux node is bound to one, attribute and style changes are applied to both.
/// Implementations report their own failures; the faux state is updated regardless.
pub trait LiveElement: Debug {
	fn set_attribute(&self, name: &str, value: &str);
	fn remove_attribute(&self, name: &str);
	fn set_style_property(&self, name: &str, value: &str);
	fn remove_style_property(&self, name: &str);
	fn bounding_client_rect(&self) -> Option<Rect>;
}

impl LiveElement for web_sys::Element {
	fn set_attribute(&self, name: &str, value: &str) {
		if let Err(error) = web_sys::Element::set_attribute(self, name, value) {
			error!("Failed to set live attribute {:?}: {:?}", name, error)
		}
	}

	fn remove_attribute(&self, name: &str) {
		if let Err(error) = web_sys::Element::remove_attribute(self, name) {
			error!("Failed to remove live attribute {:?}: {:?}", name, error)
		}
	}

	fn set_style_property(&self, name: &str, value: &str) {
		match inline_style(self) {
			Some(style) => {
				if let Err(error) = style.set_property(name, value) {
					error!("Failed to set live style property {:?}: {:?}", name, error)
				}
			}
			None => error!("Element <{}> has no inline style to set {:?} on.", self.tag_name(), name),
		}
	}

	fn remove_style_property(&self, name: &str) {
		match inline_style(self) {
			Some(style) => {
				if let Err(error) = style.remove_property(name) {
					error!("Failed to remove live style property {:?}: {:?}", name, error)
				}
			}
			None => error!("Element <{}> has no inline style to remove {:?} from.", self.tag_name(), name),
		}
	}

	fn bounding_client_rect(&self) -> Option<Rect> {
		let rect = self.get_bounding_client_rect();
		Some(Rect {
			x: rect.x(),
			y: rect.y(),
			width: rect.width(),
			height: rect.height(),
			top: rect.top(),
			right: rect.right(),
			bottom: rect.bottom(),
			left: rect.left(),
		})
	}
}

/// `ElementCSSInlineStyle` is only exposed per element interface.
fn inline_style(element: &web_sys::Element) -> Option<web_sys::CssStyleDeclaration> {
	if let Some(html_element) = element.dyn_ref::<web_sys::HtmlElement>() {
		Some(html_element.style())
	} else {
		element.dyn_ref::<web_sys::SvgElement>().map(web_sys::SvgElement::style)
	}
}
