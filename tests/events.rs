use lignin_faux_dom::{Document, Event, FauxElement, Listener};
use std::{cell::RefCell, rc::Rc};

type Log = Rc<RefCell<Vec<String>>>;

fn logging(log: &Log, label: &'static str) -> Listener {
	let log = Rc::clone(log);
	Listener::new(move |this: &FauxElement, event: &Event| log.borrow_mut().push(format!("{} {} {}", label, event.event_type(), this.node_name())))
}

#[test]
fn listeners_run_in_registration_order() {
	let document = Document::new();
	let button = document.create_element("button");
	let log = Log::default();
	let first = logging(&log, "first");
	let second = logging(&log, "second");

	button.add_event_listener("click", first.clone());
	button.add_event_listener("onClick", second.clone());
	assert!(button.dispatch_event(&Event::new("click")));
	assert_eq!(*log.borrow(), vec!["first click button", "second click button"]);

	log.borrow_mut().clear();
	button.remove_event_listener("click", &first);
	assert!(button.dispatch_event(&Event::new("onClick")));
	assert_eq!(*log.borrow(), vec!["second click button"]);
}

#[test]
fn removal_is_by_identity_and_one_at_a_time() {
	let document = Document::new();
	let button = document.create_element("button");
	let log = Log::default();
	let listener = logging(&log, "listener");

	button.add_event_listener("mouseover", listener.clone());
	button.add_event_listener("mouseover", listener.clone());
	button.remove_event_listener("mouseover", &logging(&log, "listener"));
	button.remove_event_listener("mouseover", &listener);
	button.remove_event_listener("mouseout", &listener);

	button.dispatch_event(&Event::new("mouseover"));
	assert_eq!(log.borrow().len(), 1);

	button.remove_event_listener("mouseover", &listener);
	assert!(!button.dispatch_event(&Event::new("mouseover")));
}

#[test]
fn listeners_may_mutate_the_tree() {
	let document = Document::new();
	let list = document.create_element("ul");
	let item = list.append_child(&document.create_element("li"));
	item.add_event_listener(
		"click",
		Listener::new(|this, _| {
			let parent = this.parent_node().unwrap();
			parent.remove_child(this).unwrap();
			this.set_attribute("data-removed", "true");
		}),
	);

	assert!(item.dispatch_event(&Event::new("click")));
	assert!(list.children().is_empty());
	assert_eq!(item.get_attribute("data-removed").as_deref(), Some("true"));
}
