//! Name normalization and inline style parsing.
//!
//! Imperative code reaches for the same attribute, style property or event under several
//! spellings (`className` and `class`, `backgroundColor` and `background-color`,
//! `onClick` and `click`). Every map in a faux node is keyed by the canonical DOM spelling
//! returned from here, so any accepted spelling finds the same entry.
//!
//! All functions in this module are pure and total.

use std::borrow::Cow;

/// Canonical DOM attribute name.
///
/// JSX-style property names are folded onto the attribute they stand for.
/// All-uppercase names are lowercased (`ID` → `id`), while mixed-case names that aren't
/// known aliases are kept as they are, since SVG attributes like `viewBox` are case-sensitive.
#[must_use]
pub fn attribute(name: &str) -> Cow<'_, str> {
	let alias = match name {
		"className" => "class",
		"htmlFor" => "for",
		"acceptCharset" => "accept-charset",
		"httpEquiv" => "http-equiv",
		"xlinkHref" => "xlink:href",
		"xlinkTitle" => "xlink:title",
		"xmlBase" => "xml:base",
		"xmlLang" => "xml:lang",
		"xmlSpace" => "xml:space",
		"alignmentBaseline" => "alignment-baseline",
		"baselineShift" => "baseline-shift",
		"clipPath" => "clip-path",
		"clipRule" => "clip-rule",
		"dominantBaseline" => "dominant-baseline",
		"fillOpacity" => "fill-opacity",
		"fillRule" => "fill-rule",
		"floodColor" => "flood-color",
		"floodOpacity" => "flood-opacity",
		"fontFamily" => "font-family",
		"fontSize" => "font-size",
		"fontStyle" => "font-style",
		"fontWeight" => "font-weight",
		"letterSpacing" => "letter-spacing",
		"lightingColor" => "lighting-color",
		"markerEnd" => "marker-end",
		"markerMid" => "marker-mid",
		"markerStart" => "marker-start",
		"pointerEvents" => "pointer-events",
		"shapeRendering" => "shape-rendering",
		"stopColor" => "stop-color",
		"stopOpacity" => "stop-opacity",
		"strokeDasharray" => "stroke-dasharray",
		"strokeDashoffset" => "stroke-dashoffset",
		"strokeLinecap" => "stroke-linecap",
		"strokeLinejoin" => "stroke-linejoin",
		"strokeMiterlimit" => "stroke-miterlimit",
		"strokeOpacity" => "stroke-opacity",
		"strokeWidth" => "stroke-width",
		"textAnchor" => "text-anchor",
		"textDecoration" => "text-decoration",
		"textRendering" => "text-rendering",
		"vectorEffect" => "vector-effect",
		"wordSpacing" => "word-spacing",
		"writingMode" => "writing-mode",
		_ => {
			return if name.bytes().any(|b| b.is_ascii_uppercase()) && !name.bytes().any(|b| b.is_ascii_lowercase()) {
				Cow::Owned(name.to_ascii_lowercase())
			} else {
				Cow::Borrowed(name)
			};
		}
	};
	Cow::Borrowed(alias)
}

/// Canonical CSS property name, in the hyphenated form `CSSStyleDeclaration::setProperty` accepts.
///
/// Custom properties (`--name`) are kept verbatim. camelCase names are hyphenated,
/// including vendor prefixes (`WebkitTransform` and `msTransform` become
/// `-webkit-transform` and `-ms-transform`).
#[must_use]
pub fn style_property(name: &str) -> Cow<'_, str> {
	if name.starts_with("--") {
		return Cow::Borrowed(name);
	}
	match name {
		"cssFloat" | "styleFloat" => return Cow::Borrowed("float"),
		_ => (),
	}
	if !name.bytes().any(|b| b.is_ascii_uppercase()) {
		return Cow::Borrowed(name);
	}
	if name.contains('-') || !name.bytes().any(|b| b.is_ascii_lowercase()) {
		return Cow::Owned(name.to_ascii_lowercase());
	}

	let mut hyphenated = String::with_capacity(name.len() + 4);
	if name.starts_with("ms") && name[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
		hyphenated.push('-');
	}
	for (i, c) in name.char_indices() {
		if c.is_ascii_uppercase() {
			if i != 0 || name.starts_with(|c: char| c.is_ascii_uppercase()) {
				hyphenated.push('-');
			}
			hyphenated.push(c.to_ascii_lowercase());
		} else {
			hyphenated.push(c);
		}
	}
	Cow::Owned(hyphenated)
}

/// Canonical event type as passed to `EventTarget::addEventListener`.
///
/// camelCase handler-property spellings (`onClick`) lose their prefix and are lowercased,
/// as handler properties only exist for the built-in, lowercase event types.
/// Any other name is an event type already and only trimmed, since event types are
/// case-sensitive: a custom `myEvent` stays `myEvent`, and `online` stays intact.
#[must_use]
pub fn event(name: &str) -> Cow<'_, str> {
	let name = name.trim();
	match name.strip_prefix("on") {
		Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => Cow::Owned(rest.to_ascii_lowercase()),
		_ => Cow::Borrowed(name),
	}
}

/// Splits inline CSS text (`"color: red; margin: 0"`) into declarations.
///
/// Property names are returned as written. A declaration with an empty value is kept, which
/// removes that property when applied. Fragments without a name or a `:` are skipped instead
/// of failing the whole parse.
#[must_use]
pub fn parse_style_text(text: &str) -> Vec<(&str, &str)> {
	text.split(';')
		.filter_map(|declaration| {
			let declaration = declaration.trim();
			if declaration.is_empty() {
				return None;
			}

			let mut parts = declaration.splitn(2, ':');
			let name = parts.next()?.trim();
			let value = parts.next()?.trim();

			if name.is_empty() {
				return None;
			}

			Some((name, value))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn attribute_aliases() {
		assert_eq!(attribute("className"), "class");
		assert_eq!(attribute("class"), "class");
		assert_eq!(attribute("htmlFor"), "for");
		assert_eq!(attribute("strokeWidth"), "stroke-width");
		assert_eq!(attribute("xlinkHref"), "xlink:href");
		assert_eq!(attribute("ID"), "id");
		assert_eq!(attribute("viewBox"), "viewBox");
		assert_eq!(attribute("data-value"), "data-value");
	}

	#[test]
	fn style_property_spellings() {
		assert_eq!(style_property("background-color"), "background-color");
		assert_eq!(style_property("backgroundColor"), "background-color");
		assert_eq!(style_property("BACKGROUND-COLOR"), "background-color");
		assert_eq!(style_property("WebkitTransform"), "-webkit-transform");
		assert_eq!(style_property("msTransform"), "-ms-transform");
		assert_eq!(style_property("cssFloat"), "float");
		assert_eq!(style_property("--mainColor"), "--mainColor");
		assert_eq!(style_property("ms"), "ms");
		assert_eq!(style_property("COLOR"), "color");
	}

	#[test]
	fn event_spellings() {
		assert_eq!(event("click"), "click");
		assert_eq!(event("onClick"), "click");
		assert_eq!(event("onMouseOver"), "mouseover");
		assert_eq!(event(" onMouseOver "), "mouseover");
		assert_eq!(event("online"), "online");
		assert_eq!(event("myEvent"), "myEvent");
		assert_eq!(event("CLICK"), "CLICK");
	}

	#[test]
	fn style_text_tolerates_garbage() {
		assert_eq!(
			parse_style_text("color: red; margin:0;;broken; :nameless; empty: ; background: url(http://x/y.png)"),
			vec![("color", "red"), ("margin", "0"), ("empty", ""), ("background", "url(http://x/y.png)")]
		);
		assert!(parse_style_text("").is_empty());
	}
}
