use bumpalo::Bump;
use lignin::{Node, ThreadBound};
use lignin_faux_dom::{Document, FauxElement, ForeignContent, Listener};
use std::{cell::Cell, rc::Rc};

fn element<'a>(node: &Node<'a, ThreadBound>) -> &'a lignin::Element<'a, ThreadBound> {
	match *node {
		Node::HtmlElement { element, .. } | Node::SvgElement { element, .. } | Node::MathMlElement { element, .. } => element,
		_ => panic!("Expected an element."),
	}
}

fn attributes<'a>(element: &lignin::Element<'a, ThreadBound>) -> Vec<(&'a str, &'a str)> {
	element.attributes.iter().map(|attribute| (attribute.name, attribute.value)).collect()
}

fn keyed<'a>(element: &lignin::Element<'a, ThreadBound>) -> &'a [lignin::ReorderableFragment<'a, ThreadBound>] {
	match element.content {
		Node::Keyed(fragments) => fragments,
		_ => panic!("Expected keyed content."),
	}
}

fn is_empty(node: &Node<'_, ThreadBound>) -> bool {
	matches!(node, Node::Multi(nodes) if nodes.is_empty())
}

#[test]
fn round_trip() {
	let document = Document::new();
	let root = document.create_element("div");
	root.set_attribute("id", "chart");
	root.set_attribute("className", "wide");
	root.set_attribute("style", "color: red; margin-top: 1px");
	let children: Vec<FauxElement> = (0..3)
		.map(|i| {
			let child = document.create_element("p");
			child.set_attribute("data-index", &i.to_string());
			child.set_text_content(&format!("Paragraph {}", i));
			root.append_child(&child)
		})
		.collect();

	let bump = Bump::new();
	let vdom = root.to_vdom(&bump, 10);
	let element = element(&vdom);

	assert_eq!(element.name, "DIV");
	assert_eq!(attributes(element), vec![("id", "chart"), ("class", "wide"), ("style", "color: red; margin-top: 1px;")]);

	let fragments = keyed(element);
	assert_eq!(fragments.iter().map(|fragment| fragment.dom_key).collect::<Vec<_>>(), children.iter().map(|child| child.node_id().get()).collect::<Vec<_>>());
	for (i, fragment) in fragments.iter().enumerate() {
		let child = self::element(&fragment.content);
		assert_eq!(child.name, "P");
		assert_eq!(attributes(child), vec![("data-index", i.to_string().as_str())]);
		assert!(matches!(child.content, Node::Text { text, .. } if text == format!("Paragraph {}", i)));
	}
}

#[test]
fn dom_keys_are_child_ids() {
	let document = Document::new();
	let list = document.create_element("ol");
	let items: Vec<FauxElement> = (0..3).map(|_| list.append_child(&document.create_element("li"))).collect();
	list.insert_before(&items[2], Some(&items[0]));

	let bump = Bump::new();
	let vdom = list.to_vdom(&bump, 10);
	let keys: Vec<u32> = keyed(element(&vdom)).iter().map(|fragment| fragment.dom_key).collect();
	assert_eq!(keys, [&items[2], &items[0], &items[1]].iter().map(|item| item.node_id().get()).collect::<Vec<u32>>());
}

#[test]
fn text_replaces_children() {
	let document = Document::new();
	let p = document.create_element("p");
	p.append_child(&document.create_element("b"));
	p.set_text_content("plain");

	let bump = Bump::new();
	let vdom = p.to_vdom(&bump, 10);
	assert!(matches!(element(&vdom).content, Node::Text { text: "plain", .. }));

	p.set_text_content("");
	let vdom = p.to_vdom(&bump, 10);
	assert_eq!(keyed(element(&vdom)).len(), 1);
}

#[test]
fn namespaces_follow_the_tree() {
	let document = Document::new();
	let body = document.create_element("body");
	let svg = body.append_child(&document.create_element("svg"));
	let rect = svg.append_child(&document.create_element("rect"));
	let foreign_object = svg.append_child(&document.create_element("foreignObject"));
	let div = foreign_object.append_child(&document.create_element("div"));
	let math = body.append_child(&document.create_element("math"));
	math.append_child(&document.create_element("mi"));

	let bump = Bump::new();
	let vdom = body.to_vdom(&bump, 10);
	let children = keyed(element(&vdom));
	assert!(matches!(children[0].content, Node::SvgElement { element, .. } if element.name == "svg"));
	assert!(matches!(children[1].content, Node::MathMlElement { element, .. } if element.name == "math"));

	let svg_children = keyed(element(&children[0].content));
	assert!(matches!(svg_children[0].content, Node::SvgElement { element, .. } if element.name == "rect"));
	assert!(matches!(svg_children[1].content, Node::SvgElement { element, .. } if element.name == "foreignObject"));
	let html = keyed(element(&svg_children[1].content));
	assert!(matches!(html[0].content, Node::HtmlElement { element, .. } if element.name == "DIV"));

	let math_children = keyed(element(&children[1].content));
	assert!(matches!(math_children[0].content, Node::MathMlElement { element, .. } if element.name == "mi"));

	// Subtrees are rendered in the context of their ancestors.
	assert!(matches!(rect.to_vdom(&bump, 10), Node::SvgElement { .. }));
	assert!(matches!(div.to_vdom(&bump, 10), Node::HtmlElement { .. }));
}

#[test]
fn event_bindings_are_stable_across_passes() {
	let document = Document::new();
	let button = document.create_element("button");
	button.add_event_listener("click", Listener::new(|_, _| ()));
	button.add_event_listener("onClick", Listener::new(|_, _| ()));
	button.add_event_listener("mouseover", Listener::new(|_, _| ()));

	let bump = Bump::new();
	let first = button.to_vdom(&bump, 10);
	let second = button.to_vdom(&bump, 10);

	let names: Vec<_> = element(&first).event_bindings.iter().map(|binding| binding.name).collect();
	assert_eq!(names, vec!["click", "mouseover"]);
	for (a, b) in element(&first).event_bindings.iter().zip(element(&second).event_bindings) {
		assert!(a.callback == b.callback);
	}
	match (first, second) {
		(Node::HtmlElement { dom_binding: a, .. }, Node::HtmlElement { dom_binding: b, .. }) => {
			assert!(a.is_some());
			assert!(a == b);
		}
		_ => unreachable!(),
	}
}

#[test]
fn removed_nodes_are_hidden_until_reattached() {
	let document = Document::new();
	let invalidations = Rc::new(Cell::new(0));
	document.on_invalidate({
		let invalidations = Rc::clone(&invalidations);
		move || invalidations.set(invalidations.get() + 1)
	});

	let list = document.create_element("ul");
	let never_rendered = document.create_element("li");
	let item = list.append_child(&document.create_element("li"));

	let bump = Bump::new();
	let _ = list.to_vdom(&bump, 10);

	list.remove_child(&item).unwrap();
	assert_eq!(invalidations.get(), 1);
	assert!(is_empty(&item.to_vdom(&bump, 10)));

	list.append_child(&never_rendered);
	list.remove_child(&never_rendered).unwrap();
	assert_eq!(invalidations.get(), 1);

	list.append_child(&item);
	assert!(matches!(item.to_vdom(&bump, 10), Node::HtmlElement { .. }));

	item.unmount();
	item.unmount();
	assert_eq!(invalidations.get(), 2);
	assert!(is_empty(&keyed(element(&list.to_vdom(&bump, 10)))[0].content));
}

#[test]
fn depth_limit_cuts_off_rendering() {
	let document = Document::new();
	let outer = document.create_element("div");
	let inner = outer.append_child(&document.create_element("div"));
	inner.append_child(&document.create_element("div"));

	let bump = Bump::new();
	let vdom = outer.to_vdom(&bump, 2);
	let inner = keyed(element(&vdom));
	let innermost = keyed(element(&inner[0].content));
	assert!(is_empty(&innermost[0].content));

	assert!(is_empty(&outer.to_vdom(&bump, 0)));
}

#[derive(Debug)]
struct Badge(&'static str);
impl ForeignContent for Badge {
	fn render<'a>(&self, _bump: &'a Bump) -> Node<'a, ThreadBound> {
		Node::Text { text: self.0, dom_binding: None }
	}
}

#[test]
fn foreign_content_renders_verbatim() {
	let document = Document::new();
	let div = document.create_element("div");
	let badge = div.append_child(&document.create_foreign(Rc::new(Badge("new"))));
	div.append_child(&document.create_element("span"));

	assert!(badge.is_foreign());
	assert_eq!(div.children().len(), 2);
	assert_eq!(div.get_elements_by_tag_name("*").len(), 1);
	assert_eq!(div.query_selector_all("*").unwrap().len(), 1);

	badge.set_attribute("id", "ignored");
	assert_eq!(badge.get_attribute("id"), None);

	let bump = Bump::new();
	let vdom = div.to_vdom(&bump, 10);
	let children = keyed(element(&vdom));
	assert!(matches!(children[0].content, Node::Text { text: "new", .. }));
	assert_eq!(children[0].dom_key, badge.node_id().get());
}
