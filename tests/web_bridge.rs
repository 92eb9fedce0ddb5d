#![cfg(target_arch = "wasm32")]

use bumpalo::Bump;
use lignin::{DomRef, Node};
use lignin_faux_dom::{Document, Listener};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn init_log() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

fn mounted_div() -> HtmlElement {
	let document = window().unwrap().document().unwrap();
	let element: HtmlElement = document.create_element("DIV").unwrap().dyn_into().unwrap();
	document.body().unwrap().append_child(&element).unwrap();
	element
}

#[wasm_bindgen_test]
fn writes_reach_the_page() {
	init_log();
	let live = mounted_div();

	let document = Document::new();
	let div = document.create_element("div");
	div.attach_live(Rc::new(web_sys::Element::from(live.clone())));

	div.set_attribute("title", "faux");
	assert_eq!(live.get_attribute("title").as_deref(), Some("faux"));

	div.set_attribute("style", "width: 20px; height: 10px");
	assert_eq!(live.style().get_property_value("width").unwrap(), "20px");

	let rect = div.get_bounding_client_rect().unwrap();
	assert_eq!((rect.width, rect.height), (20.0, 10.0));

	div.style().remove_property("height");
	assert_eq!(live.style().get_property_value("height").unwrap(), "");

	div.remove_attribute("title");
	assert!(!live.has_attribute("title"));

	live.remove();
}

#[wasm_bindgen_test]
fn dom_binding_attaches_and_detaches() {
	init_log();
	let live = mounted_div();

	let document = Document::new();
	let div = document.create_element("div");

	let bump = Bump::new();
	let dom_binding = match div.to_vdom(&bump, 10) {
		Node::HtmlElement { dom_binding, .. } => dom_binding.unwrap(),
		_ => panic!("Expected an HTML element."),
	};

	dom_binding.call(DomRef::Added((&live).into()));
	assert!(div.is_live());
	div.set_attribute("data-bound", "yes");
	assert_eq!(live.get_attribute("data-bound").as_deref(), Some("yes"));

	dom_binding.call(DomRef::Removing((&live).into()));
	assert!(!div.is_live());
	div.set_attribute("data-bound", "no");
	assert_eq!(live.get_attribute("data-bound").as_deref(), Some("yes"));

	live.remove();
}

#[wasm_bindgen_test]
fn event_bindings_dispatch_native_events() {
	init_log();
	let document = Document::new();
	let button = document.create_element("button");
	let received = Rc::new(RefCell::new(Vec::new()));
	button.add_event_listener(
		"onClick",
		Listener::new({
			let received = Rc::clone(&received);
			move |this, event| received.borrow_mut().push((this.node_name(), event.event_type().to_owned(), event.native().is_some()))
		}),
	);

	let bump = Bump::new();
	let vdom = button.to_vdom(&bump, 10);
	let binding = match vdom {
		Node::HtmlElement { element, .. } => &element.event_bindings[0],
		_ => panic!("Expected an HTML element."),
	};
	assert_eq!(binding.name, "click");

	binding.callback.call(web_sys::Event::new("click").unwrap().into());
	assert_eq!(*received.borrow(), vec![("button".to_owned(), "click".to_owned(), true)]);
}
