#![doc(html_root_url = "https://docs.rs/lignin-faux-dom/0.0.1")]
#![warn(clippy::pedantic)]

//! An in-memory stand-in for the DOM that imperative, DOM-manipulating code can build and query,
//! rendered into [`lignin`] VDOM on each pass.
//!
//! Once rendered elements are mounted, attribute and style changes on their faux nodes are
//! also applied to the live elements, without waiting for the next pass.

pub use lignin;

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod bridge;
mod document;
mod element;
mod error;
pub mod names;
mod position;
mod query;
mod registry;
mod render;
mod selector;
mod style;
mod tree;

pub use bridge::{LiveElement, Rect};
pub use document::{Document, Window};
pub use element::{Attr, FauxElement};
pub use error::Error;
pub use position::DocumentPosition;
pub use registry::{Attributes, Event, Listener};
pub use style::{ComputedStyle, FauxStyle};
pub use tree::{ForeignContent, NodeId, ELEMENT_NODE};

/// Attribute and style values only appear in logs with the `"dangerous-logging"` feature.
fn loggable(value: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		value
	} else {
		"[redacted]"
	}
}
