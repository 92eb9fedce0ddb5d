//! A small CSS selector engine over the faux tree.
//!
//! Supported: selector lists, type/universal, `#id`, `.class`, attribute selectors with all
//! standard operators, `:first-child`, `:last-child`, `:only-child`, `:empty`, `:not(…)`,
//! and the descendant, `>`, `+` and `~` combinators.

use crate::{
	names,
	tree::{FauxNode, Tree, ELEMENT_NODE},
	NodeId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Complex>);

/// `compounds[i]` and `compounds[i + 1]` are joined by `combinators[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
	compounds: Vec<Compound>,
	combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound(Vec<Simple>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
	NextSibling,
	SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
	Universal,
	Type(String),
	Id(String),
	Class(String),
	Attribute { name: String, matcher: Option<(AttributeOperator, String)> },
	FirstChild,
	LastChild,
	OnlyChild,
	Empty,
	Not(Compound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOperator {
	/// `=`
	Exact,
	/// `~=`
	Includes,
	/// `|=`
	DashMatch,
	/// `^=`
	Prefix,
	/// `$=`
	Suffix,
	/// `*=`
	Substring,
}
impl AttributeOperator {
	fn matches(self, actual: &str, expected: &str) -> bool {
		match self {
			Self::Exact => actual == expected,
			Self::Includes => !expected.is_empty() && actual.split_whitespace().any(|word| word == expected),
			Self::DashMatch => actual == expected || actual.strip_prefix(expected).map_or(false, |rest| rest.starts_with('-')),
			Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
			Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
			Self::Substring => !expected.is_empty() && actual.contains(expected),
		}
	}
}

impl SelectorList {
	pub fn parse(selector: &str) -> Result<Self, &'static str> {
		let mut parser = Parser { input: selector, position: 0 };
		let mut complexes = Vec::new();
		loop {
			parser.skip_whitespace();
			complexes.push(parser.complex()?);
			parser.skip_whitespace();
			match parser.peek() {
				None => break,
				Some(',') => parser.bump(),
				Some(_) => return Err("unexpected character"),
			}
		}
		Ok(Self(complexes))
	}

	pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
		self.0.iter().any(|complex| complex.matches(tree, id))
	}
}

impl Complex {
	fn matches(&self, tree: &Tree, id: NodeId) -> bool {
		let last = self.compounds.len() - 1;
		self.compounds[last].matches(tree, id) && self.matches_leftwards(tree, id, last)
	}

	/// `id` already matched `compounds[index]`; checks everything to the left of it.
	fn matches_leftwards(&self, tree: &Tree, id: NodeId, index: usize) -> bool {
		if index == 0 {
			return true;
		}
		let left = &self.compounds[index - 1];
		let candidate = |candidate: NodeId| left.matches(tree, candidate) && self.matches_leftwards(tree, candidate, index - 1);

		match self.combinators[index - 1] {
			Combinator::Child => tree.parent(id).map_or(false, candidate),
			Combinator::Descendant => {
				let mut ancestor = tree.parent(id);
				while let Some(current) = ancestor {
					if candidate(current) {
						return true;
					}
					ancestor = tree.parent(current);
				}
				false
			}
			Combinator::NextSibling => {
				let siblings = element_siblings(tree, id);
				let index = siblings.iter().position(|&sibling| sibling == id).unwrap_or(0);
				index.checked_sub(1).map_or(false, |previous| candidate(siblings[previous]))
			}
			Combinator::SubsequentSibling => {
				let siblings = element_siblings(tree, id);
				siblings.iter().take_while(|&&sibling| sibling != id).any(|&sibling| candidate(sibling))
			}
		}
	}
}

impl Compound {
	fn matches(&self, tree: &Tree, id: NodeId) -> bool {
		match tree.element(id) {
			Some(element) if element.node_type == ELEMENT_NODE => (),
			_ => return false,
		}
		self.0.iter().all(|simple| simple.matches(tree, id))
	}
}

impl Simple {
	fn matches(&self, tree: &Tree, id: NodeId) -> bool {
		let element = match tree.element(id) {
			Some(element) => element,
			None => return false,
		};
		let attribute = |name: &str| element.attributes.get(names::attribute(name).as_ref()).map(String::as_str);

		match self {
			Self::Universal => true,
			Self::Type(name) => element.node_name.eq_ignore_ascii_case(name),
			Self::Id(id) => attribute("id") == Some(id.as_str()),
			Self::Class(class) => attribute("class").map_or(false, |classes| classes.split_whitespace().any(|c| c == class)),
			Self::Attribute { name, matcher } => match (attribute(name), matcher) {
				(None, _) => false,
				(Some(_), None) => true,
				(Some(actual), Some((operator, expected))) => operator.matches(actual, expected),
			},
			Self::FirstChild => element_siblings(tree, id).first() == Some(&id),
			Self::LastChild => element_siblings(tree, id).last() == Some(&id),
			Self::OnlyChild => element_siblings(tree, id) == [id],
			Self::Empty => element.text.is_empty() && tree.child_nodes(id).is_empty(),
			Self::Not(compound) => !compound.matches(tree, id),
		}
	}
}

/// Element siblings of `id`, including itself. Foreign nodes don't count.
fn element_siblings(tree: &Tree, id: NodeId) -> Vec<NodeId> {
	match tree.parent(id) {
		None => vec![id],
		Some(parent) => tree
			.child_nodes(parent)
			.iter()
			.copied()
			.filter(|&sibling| tree.get(sibling).and_then(FauxNode::element).map_or(false, |element| element.node_type == ELEMENT_NODE))
			.collect(),
	}
}

struct Parser<'a> {
	input: &'a str,
	position: usize,
}
impl<'a> Parser<'a> {
	fn peek(&self) -> Option<char> {
		self.input[self.position..].chars().next()
	}

	fn bump(&mut self) {
		if let Some(c) = self.peek() {
			self.position += c.len_utf8();
		}
	}

	fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.bump();
			true
		} else {
			false
		}
	}

	/// Returns whether any whitespace was skipped.
	fn skip_whitespace(&mut self) -> bool {
		let start = self.position;
		while self.peek().map_or(false, char::is_whitespace) {
			self.bump();
		}
		self.position != start
	}

	fn identifier(&mut self) -> Result<String, &'static str> {
		let start = self.position;
		while self.peek().map_or(false, |c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()) {
			self.bump();
		}
		if self.position == start {
			Err("expected an identifier")
		} else {
			Ok(self.input[start..self.position].to_owned())
		}
	}

	fn complex(&mut self) -> Result<Complex, &'static str> {
		let mut compounds = vec![self.compound()?];
		let mut combinators = Vec::new();
		loop {
			let had_whitespace = self.skip_whitespace();
			let combinator = match self.peek() {
				None | Some(',') | Some(')') => break,
				Some('>') => Combinator::Child,
				Some('+') => Combinator::NextSibling,
				Some('~') => Combinator::SubsequentSibling,
				Some(_) if had_whitespace => Combinator::Descendant,
				Some(_) => return Err("unexpected character"),
			};
			if combinator != Combinator::Descendant {
				self.bump();
				self.skip_whitespace();
			}
			combinators.push(combinator);
			compounds.push(self.compound()?);
		}
		Ok(Complex { compounds, combinators })
	}

	fn compound(&mut self) -> Result<Compound, &'static str> {
		let mut simples = Vec::new();
		loop {
			let simple = match self.peek() {
				Some('*') if simples.is_empty() => {
					self.bump();
					Simple::Universal
				}
				Some(c) if simples.is_empty() && (c.is_alphabetic() || c == '_' || !c.is_ascii()) => Simple::Type(self.identifier()?),
				Some('#') => {
					self.bump();
					Simple::Id(self.identifier()?)
				}
				Some('.') => {
					self.bump();
					Simple::Class(self.identifier()?)
				}
				Some('[') => {
					self.bump();
					self.attribute()?
				}
				Some(':') => {
					self.bump();
					self.pseudo_class()?
				}
				_ => break,
			};
			simples.push(simple);
		}
		if simples.is_empty() {
			Err("expected a selector")
		} else {
			Ok(Compound(simples))
		}
	}

	fn attribute(&mut self) -> Result<Simple, &'static str> {
		self.skip_whitespace();
		let mut name = self.identifier()?;
		// `xlink:href`-style names.
		if self.eat(':') {
			name.push(':');
			name.push_str(&self.identifier()?);
		}
		self.skip_whitespace();

		let operator = match self.peek() {
			Some(']') => {
				self.bump();
				return Ok(Simple::Attribute { name, matcher: None });
			}
			Some('=') => {
				self.bump();
				AttributeOperator::Exact
			}
			Some(c) => {
				let operator = match c {
					'~' => AttributeOperator::Includes,
					'|' => AttributeOperator::DashMatch,
					'^' => AttributeOperator::Prefix,
					'$' => AttributeOperator::Suffix,
					'*' => AttributeOperator::Substring,
					_ => return Err("unexpected character in attribute selector"),
				};
				self.bump();
				if !self.eat('=') {
					return Err("expected `=` in attribute selector");
				}
				operator
			}
			None => return Err("unterminated attribute selector"),
		};

		self.skip_whitespace();
		let value = match self.peek() {
			Some(quote @ '"') | Some(quote @ '\'') => {
				self.bump();
				let start = self.position;
				let length = self.input[start..].find(quote).ok_or("unterminated string")?;
				self.position += length + quote.len_utf8();
				self.input[start..start + length].to_owned()
			}
			_ => self.identifier()?,
		};
		self.skip_whitespace();
		if !self.eat(']') {
			return Err("unterminated attribute selector");
		}
		Ok(Simple::Attribute {
			name,
			matcher: Some((operator, value)),
		})
	}

	fn pseudo_class(&mut self) -> Result<Simple, &'static str> {
		if self.peek() == Some(':') {
			return Err("pseudo-elements never match elements");
		}
		let name = self.identifier()?.to_ascii_lowercase();
		Ok(match name.as_str() {
			"first-child" => Simple::FirstChild,
			"last-child" => Simple::LastChild,
			"only-child" => Simple::OnlyChild,
			"empty" => Simple::Empty,
			"not" => {
				if !self.eat('(') {
					return Err("expected `(` after `:not`");
				}
				self.skip_whitespace();
				let compound = self.compound()?;
				self.skip_whitespace();
				if !self.eat(')') {
					return Err("expected `)`");
				}
				Simple::Not(compound)
			}
			_ => return Err("unsupported pseudo-class"),
		})
	}
}
