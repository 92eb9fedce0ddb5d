//! Subtree searches behind `querySelector(All)`, `getElementsByTagName` and `getElementById`.

use crate::{names, selector::SelectorList, tree::Tree, Error, NodeId};
use std::collections::VecDeque;

fn parse(selector: &str) -> Result<SelectorList, Error> {
	if selector.trim().is_empty() {
		return Err(Error::EmptySelector);
	}
	SelectorList::parse(selector).map_err(|reason| Error::InvalidSelector {
		selector: selector.to_owned(),
		reason,
	})
}

/// Matching descendants of `root` in document order. `root` itself is never included.
pub(crate) fn select_all(tree: &Tree, root: NodeId, selector: &str) -> Result<Vec<NodeId>, Error> {
	let selector = parse(selector)?;
	Ok(tree.preorder(root).into_iter().skip(1).filter(|&id| selector.matches(tree, id)).collect())
}

pub(crate) fn select_first(tree: &Tree, root: NodeId, selector: &str) -> Result<Option<NodeId>, Error> {
	let selector = parse(selector)?;
	Ok(tree.preorder(root).into_iter().skip(1).find(|&id| selector.matches(tree, id)))
}

/// Pre-order over [`Tree::children`]. `"*"` matches every element, anything else the exact node name.
pub(crate) fn by_tag_name(tree: &Tree, root: NodeId, name: &str) -> Vec<NodeId> {
	fn collect(tree: &Tree, id: NodeId, name: &str, found: &mut Vec<NodeId>) {
		for child in tree.children(id) {
			if let Some(element) = tree.element(child) {
				if name == "*" || element.node_name == name {
					found.push(child)
				}
			}
			collect(tree, child, name, found)
		}
	}

	let mut found = Vec::new();
	collect(tree, root, name, &mut found);
	found
}

/// Breadth-first over [`Tree::children`], so the shallowest and then left-most match wins.
pub(crate) fn by_id(tree: &Tree, root: NodeId, id: &str) -> Option<NodeId> {
	let key = names::attribute("id");
	let mut queue: VecDeque<NodeId> = tree.children(root).into();
	while let Some(candidate) = queue.pop_front() {
		if tree.element(candidate).and_then(|element| element.attributes.get(key.as_ref())).map(String::as_str) == Some(id) {
			return Some(candidate);
		}
		queue.extend(tree.children(candidate));
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	fn append(tree: &mut Tree, parent: NodeId, name: &str, id: Option<&str>) -> NodeId {
		let child = tree.create_element(name);
		if let Some(id) = id {
			tree.element_mut(child).unwrap().attributes.insert("id".to_owned(), id.to_owned());
		}
		assert!(tree.append_child(parent, child));
		child
	}

	#[test]
	fn shallowest_id_wins() {
		let mut tree = Tree::default();
		let root = tree.create_element("div");
		let first = append(&mut tree, root, "div", None);
		let _deep = append(&mut tree, first, "span", Some("target"));
		let shallow = append(&mut tree, root, "span", Some("target"));

		assert_eq!(by_id(&tree, root, "target"), Some(shallow));
		assert_eq!(by_id(&tree, root, "missing"), None);
	}

	#[test]
	fn tag_names_in_document_order() {
		let mut tree = Tree::default();
		let root = tree.create_element("svg");
		let g = append(&mut tree, root, "g", None);
		let inner = append(&mut tree, g, "rect", None);
		let outer = append(&mut tree, root, "rect", None);

		assert_eq!(by_tag_name(&tree, root, "rect"), vec![inner, outer]);
		assert_eq!(by_tag_name(&tree, root, "*"), vec![g, inner, outer]);
		assert!(by_tag_name(&tree, root, "RECT").is_empty());
	}

	#[test]
	fn selector_errors() {
		let mut tree = Tree::default();
		let root = tree.create_element("div");
		assert_eq!(select_all(&tree, root, "  "), Err(Error::EmptySelector));
		assert!(matches!(select_first(&tree, root, "div["), Err(Error::InvalidSelector { .. })));

		let child = append(&mut tree, root, "p", None);
		assert_eq!(select_all(&tree, root, "div, p"), Ok(vec![child]));
		assert_eq!(select_first(&tree, root, "div p"), Ok(Some(child)));
	}
}
