use std::fmt::Display;

use crate::NestedAnnotation;
use crate::PositionRange;
use crate::TypeNode;

/// The root of a parsed docblock: an ordered list of children.
///
/// Order is rendering order. Collaborators may add, remove, replace and
/// reorder children freely between parsing and printing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTree {
	children: Vec<ChildNode>,
	single_line: bool,
}

impl DocTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_children(children: Vec<ChildNode>) -> Self {
		Self {
			children,
			single_line: false,
		}
	}

	pub fn children(&self) -> &[ChildNode] {
		&self.children
	}

	pub fn children_mut(&mut self) -> &mut Vec<ChildNode> {
		&mut self.children
	}

	pub fn len(&self) -> usize {
		self.children.len()
	}

	/// True when the tree has no children at all. See
	/// [`DocTree::is_effectively_empty`] for the looser check.
	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	pub fn push(&mut self, child: impl Into<ChildNode>) {
		self.children.push(child.into());
	}

	/// Insert a child at `index`, appending when `index` is past the end.
	pub fn insert(&mut self, index: usize, child: impl Into<ChildNode>) {
		let index = index.min(self.children.len());
		self.children.insert(index, child.into());
	}

	pub fn remove(&mut self, index: usize) -> Option<ChildNode> {
		(index < self.children.len()).then(|| self.children.remove(index))
	}

	/// Replace the child at `index`, returning the previous child.
	pub fn replace(&mut self, index: usize, child: impl Into<ChildNode>) -> Option<ChildNode> {
		let slot = self.children.get_mut(index)?;
		Some(std::mem::replace(slot, child.into()))
	}

	pub fn retain(&mut self, keep: impl FnMut(&ChildNode) -> bool) {
		self.children.retain(keep);
	}

	/// Remove every tag with the given name. Returns how many were removed.
	pub fn remove_tags_named(&mut self, name: &str) -> usize {
		let before = self.children.len();
		self.children
			.retain(|child| child.as_tag().is_none_or(|tag| tag.name != name));
		before - self.children.len()
	}

	pub fn is_single_line(&self) -> bool {
		self.single_line
	}

	/// Ask the printer to collapse the output onto one physical line.
	pub fn set_single_line(&mut self, single_line: bool) {
		self.single_line = single_line;
	}

	pub fn tags(&self) -> impl Iterator<Item = &TagNode> {
		self.children.iter().filter_map(ChildNode::as_tag)
	}

	pub fn tags_mut(&mut self) -> impl Iterator<Item = &mut TagNode> {
		self.children.iter_mut().filter_map(ChildNode::as_tag_mut)
	}

	pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TagNode> {
		self.tags().filter(move |tag| tag.name == name)
	}

	/// A tree is effectively empty when it has no children or only children
	/// without payload (blank text lines and tags emptied with
	/// [`ValueNode::Empty`]).
	pub fn is_effectively_empty(&self) -> bool {
		self.children.iter().all(|child| {
			match child {
				ChildNode::Text(text) => text.text.trim().is_empty(),
				ChildNode::Tag(tag) => matches!(tag.value, ValueNode::Empty),
			}
		})
	}

	/// Whether any tag resolved to the nested annotation `name`.
	pub fn has_annotation(&self, name: &str) -> bool {
		let name = name.trim_start_matches('\\');
		self.tags().any(|tag| {
			matches!(&tag.value, ValueNode::Annotation(annotation)
				if annotation.name.trim_start_matches('\\') == name)
		})
	}

	/// The first tag value of the given kind.
	pub fn first_value(&self, kind: ValueKind) -> Option<&ValueNode> {
		self.tags()
			.map(|tag| &tag.value)
			.find(|value| value.kind() == kind)
	}

	pub fn return_value(&self) -> Option<&ReturnValue> {
		match self.first_value(ValueKind::Return)? {
			ValueNode::Return(value) => Some(value),
			_ => None,
		}
	}

	pub fn var_value(&self) -> Option<&VarValue> {
		match self.first_value(ValueKind::Var)? {
			ValueNode::Var(value) => Some(value),
			_ => None,
		}
	}

	/// The `@param` value for the variable `name` (with or without `$`).
	pub fn param_value(&self, name: &str) -> Option<&ParamValue> {
		let name = name.trim_start_matches('$');
		self.tags().find_map(|tag| {
			match &tag.value {
				ValueNode::Param(value) if value.name.trim_start_matches('$') == name => Some(value),
				_ => None,
			}
		})
	}
}

/// A child of a [`DocTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum ChildNode {
	/// Free text on its own line.
	Text(TextNode),
	/// A tag with its value, e.g. `@return int`.
	Tag(TagNode),
}

impl ChildNode {
	pub fn range(&self) -> Option<PositionRange> {
		match self {
			Self::Text(text) => text.range,
			Self::Tag(tag) => tag.range,
		}
	}

	pub fn as_tag(&self) -> Option<&TagNode> {
		match self {
			Self::Tag(tag) => Some(tag),
			Self::Text(_) => None,
		}
	}

	pub fn as_tag_mut(&mut self) -> Option<&mut TagNode> {
		match self {
			Self::Tag(tag) => Some(tag),
			Self::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextNode> {
		match self {
			Self::Text(text) => Some(text),
			Self::Tag(_) => None,
		}
	}

	/// A short label used in logs and error messages.
	pub fn label(&self) -> String {
		match self {
			Self::Text(text) => format!("text `{}`", text.text),
			Self::Tag(tag) => format!("tag `{}`", tag.name),
		}
	}
}

impl Display for ChildNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Text(text) => write!(f, "{text}"),
			Self::Tag(tag) => write!(f, "{tag}"),
		}
	}
}

impl From<TextNode> for ChildNode {
	fn from(text: TextNode) -> Self {
		Self::Text(text)
	}
}

impl From<TagNode> for ChildNode {
	fn from(tag: TagNode) -> Self {
		Self::Tag(tag)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
	pub text: String,
	pub(crate) range: Option<PositionRange>,
}

impl TextNode {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			range: None,
		}
	}

	pub fn range(&self) -> Option<PositionRange> {
		self.range
	}

	pub fn set_text(&mut self, text: impl Into<String>) {
		self.text = text.into();
	}
}

impl Display for TextNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

/// A tag such as `@param int $id the identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
	/// The tag name including its marker, e.g. `@param`.
	pub name: String,
	pub value: ValueNode,
	pub(crate) range: Option<PositionRange>,
	/// The description exactly as written (line decorations removed, line
	/// breaks kept), recorded when it differs from the normalized
	/// description held by the value.
	pub(crate) original_description: Option<String>,
}

impl TagNode {
	pub fn new(name: impl Into<String>, value: ValueNode) -> Self {
		Self {
			name: name.into(),
			value,
			range: None,
			original_description: None,
		}
	}

	pub fn range(&self) -> Option<PositionRange> {
		self.range
	}

	pub fn original_description(&self) -> Option<&str> {
		self.original_description.as_deref()
	}

	/// Replace the value in place. The tag keeps its position in the source
	/// so the printer re-renders it where it was.
	pub fn set_value(&mut self, value: ValueNode) {
		self.value = value;
	}

	/// Replace the value and forget where the tag came from. The printer
	/// treats the tag as new and its original line as removed.
	pub fn set_value_detached(&mut self, value: ValueNode) {
		self.value = value;
		self.range = None;
		self.original_description = None;
	}

	/// Whether the printer should restore the original description text.
	pub fn has_verbatim_description(&self) -> bool {
		self.original_description.is_some()
			&& self
				.value
				.description()
				.is_some_and(|description| !description.is_empty())
	}
}

impl Display for TagNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let value = self.value.to_string();

		if value.is_empty() || value.starts_with('(') {
			write!(f, "{}{value}", self.name)
		} else {
			write!(f, "{} {value}", self.name)
		}
	}
}

/// The discriminant of a [`ValueNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Generic,
	Param,
	Return,
	Var,
	Throws,
	Annotation,
	Empty,
}

impl ValueKind {
	/// The well-known tags whose payload follows the type grammar.
	pub fn is_structural(self) -> bool {
		matches!(self, Self::Param | Self::Return | Self::Var | Self::Throws)
	}
}

/// The payload of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum ValueNode {
	/// Untyped payload kept as written.
	Generic(String),
	Param(ParamValue),
	Return(ReturnValue),
	Var(VarValue),
	Throws(ThrowsValue),
	/// A named call such as `@Route("/", name="home")`.
	Annotation(NestedAnnotation),
	/// Placeholder for a tag whose content was cleared.
	Empty,
}

impl ValueNode {
	pub fn generic(value: impl Into<String>) -> Self {
		Self::Generic(value.into())
	}

	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Generic(_) => ValueKind::Generic,
			Self::Param(_) => ValueKind::Param,
			Self::Return(_) => ValueKind::Return,
			Self::Var(_) => ValueKind::Var,
			Self::Throws(_) => ValueKind::Throws,
			Self::Annotation(_) => ValueKind::Annotation,
			Self::Empty => ValueKind::Empty,
		}
	}

	pub fn description(&self) -> Option<&str> {
		match self {
			Self::Param(value) => Some(&value.description),
			Self::Return(value) => Some(&value.description),
			Self::Var(value) => Some(&value.description),
			Self::Throws(value) => Some(&value.description),
			Self::Generic(_) | Self::Annotation(_) | Self::Empty => None,
		}
	}

	pub fn r#type(&self) -> Option<&TypeNode> {
		match self {
			Self::Param(value) => value.r#type.as_ref(),
			Self::Return(value) => Some(&value.r#type),
			Self::Var(value) => value.r#type.as_ref(),
			Self::Throws(value) => Some(&value.r#type),
			Self::Generic(_) | Self::Annotation(_) | Self::Empty => None,
		}
	}

	/// Replace the type of a structural value. Returns `false` for values
	/// without a type.
	pub fn set_type(&mut self, r#type: TypeNode) -> bool {
		match self {
			Self::Param(value) => value.r#type = Some(r#type),
			Self::Return(value) => value.r#type = r#type,
			Self::Var(value) => value.r#type = Some(r#type),
			Self::Throws(value) => value.r#type = r#type,
			Self::Generic(_) | Self::Annotation(_) | Self::Empty => return false,
		}

		true
	}
}

impl Display for ValueNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Generic(value) => write!(f, "{value}"),
			Self::Param(value) => write!(f, "{value}"),
			Self::Return(value) => write!(f, "{value}"),
			Self::Var(value) => write!(f, "{value}"),
			Self::Throws(value) => write!(f, "{value}"),
			Self::Annotation(value) => write!(f, "{value}"),
			Self::Empty => Ok(()),
		}
	}
}

/// Join the non-empty parts with single spaces.
fn write_parts(f: &mut std::fmt::Formatter<'_>, parts: &[&str]) -> std::fmt::Result {
	let joined = parts
		.iter()
		.filter(|part| !part.is_empty())
		.copied()
		.collect::<Vec<_>>()
		.join(" ");

	write!(f, "{joined}")
}

/// `@param ?int &...$ids description`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
	pub r#type: Option<TypeNode>,
	pub is_reference: bool,
	pub is_variadic: bool,
	/// The parameter name including `$`.
	pub name: String,
	pub description: String,
}

impl Display for ParamValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let r#type = self.r#type.as_ref().map(ToString::to_string).unwrap_or_default();
		let reference = if self.is_reference { "&" } else { "" };
		let variadic = if self.is_variadic { "..." } else { "" };
		let name = format!("{reference}{variadic}{}", self.name);

		write_parts(f, &[&r#type, &name, &self.description])
	}
}

/// `@return int description`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
	pub r#type: TypeNode,
	pub description: String,
}

impl Display for ReturnValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write_parts(f, &[&self.r#type.to_string(), &self.description])
	}
}

/// `@var int $count description`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarValue {
	pub r#type: Option<TypeNode>,
	pub name: Option<String>,
	pub description: String,
}

impl Display for VarValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let r#type = self.r#type.as_ref().map(ToString::to_string).unwrap_or_default();
		let name = self.name.as_deref().unwrap_or_default();

		write_parts(f, &[&r#type, name, &self.description])
	}
}

/// `@throws \RuntimeException description`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowsValue {
	pub r#type: TypeNode,
	pub description: String,
}

impl Display for ThrowsValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write_parts(f, &[&self.r#type.to_string(), &self.description])
	}
}
