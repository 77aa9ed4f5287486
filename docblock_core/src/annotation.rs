use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use crate::DocblockError;
use crate::DocblockResult;
use crate::lexer::tokenize;
use crate::tokens::TokenCursor;
use crate::tokens::TokenKind;

/// The key positional arguments fall under when no silent key is configured.
pub const DEFAULT_SILENT_KEY: &str = "value";

/// Maps a tag name to the fully qualified name of the annotation it refers to
/// in the context of the code the comment is attached to.
///
/// Returning `None` is not an error. The tag payload is then kept as raw text.
pub trait NameResolver: std::fmt::Debug {
	fn resolve(&self, tag_name: &str, host: &HostScope) -> Option<String>;
}

/// Resolves nothing. Every unknown tag stays generic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl NameResolver for NoopResolver {
	fn resolve(&self, _tag_name: &str, _host: &HostScope) -> Option<String> {
		None
	}
}

/// The semantic context a comment is attached to: the namespace of the
/// surrounding code and the aliases it imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostScope {
	#[serde(default)]
	pub namespace: Option<String>,
	/// Import alias to fully qualified name, e.g. `ORM` to
	/// `Doctrine\ORM\Mapping`.
	#[serde(default)]
	pub uses: BTreeMap<String, String>,
}

impl HostScope {
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: Some(namespace.into()),
			uses: BTreeMap::new(),
		}
	}

	pub fn with_use(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
		self.uses.insert(alias.into(), name.into());
		self
	}
}

/// Fully qualified annotation name to the key its positional argument is
/// stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SilentKeyMap(BTreeMap<String, String>);

impl SilentKeyMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, name: impl Into<String>, key: impl Into<String>) {
		let name: String = name.into();
		self.0
			.insert(name.trim_start_matches('\\').to_string(), key.into());
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name.trim_start_matches('\\')).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SilentKeyMap {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut map = Self::new();
		for (name, key) in iter {
			map.insert(name, key);
		}
		map
	}
}

/// Resolves tag names through explicit aliases and the import aliases of the
/// host scope.
///
/// Lookup order:
///
/// 1. a fully qualified tag (`@\Foo\Bar`) resolves to itself
/// 2. configured aliases, matched on the whole name
/// 3. host imports, matched on the first namespace segment so that
///    `@ORM\Column` becomes `Doctrine\ORM\Mapping\Column`
/// 4. the host namespace, for unqualified names, when enabled
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
	aliases: BTreeMap<String, String>,
	resolve_in_namespace: bool,
}

impl ImportResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_alias(mut self, alias: impl Into<String>, name: impl Into<String>) -> Self {
		self.aliases.insert(alias.into(), name.into());
		self
	}

	pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = (String, String)>) -> Self {
		self.aliases.extend(aliases);
		self
	}

	/// Resolve capitalized unqualified tag names relative to the host
	/// namespace.
	pub fn resolve_in_namespace(mut self, enabled: bool) -> Self {
		self.resolve_in_namespace = enabled;
		self
	}
}

impl NameResolver for ImportResolver {
	fn resolve(&self, tag_name: &str, host: &HostScope) -> Option<String> {
		let name = tag_name.trim_start_matches('@');

		if name.is_empty() {
			return None;
		}

		if let Some(qualified) = name.strip_prefix('\\') {
			return (!qualified.is_empty()).then(|| qualified.to_string());
		}

		if let Some(resolved) = self.aliases.get(name) {
			let resolved = resolved.trim_start_matches('\\');
			return (!resolved.is_empty()).then(|| resolved.to_string());
		}

		let (first, rest) = match name.split_once('\\') {
			Some((first, rest)) => (first, Some(rest)),
			None => (name, None),
		};

		if let Some(imported) = host.uses.get(first) {
			let imported = imported.trim_start_matches('\\');
			return Some(match rest {
				Some(rest) => format!("{imported}\\{rest}"),
				None => imported.to_string(),
			});
		}

		let is_class_like = name.chars().next().is_some_and(char::is_uppercase);
		if self.resolve_in_namespace && rest.is_none() && is_class_like {
			if let Some(namespace) = &host.namespace {
				return Some(format!("{}\\{name}", namespace.trim_matches('\\')));
			}
		}

		None
	}
}

/// A tag payload shaped like a named call, e.g. `(path="/", name="home")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedAnnotation {
	/// Fully qualified name.
	pub name: String,
	/// The name as written inside a payload, e.g. `@Assert\NotBlank` for a
	/// nested argument. `None` when the name is the tag itself.
	pub written_name: Option<String>,
	/// The payload exactly as it appeared in the comment.
	pub raw: String,
	pub arguments: Vec<AnnotationArgument>,
	/// The configured key for positional arguments, if any.
	pub silent_key: Option<String>,
	pub has_parentheses: bool,
}

impl NestedAnnotation {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			written_name: None,
			raw: String::new(),
			arguments: vec![],
			silent_key: None,
			has_parentheses: false,
		}
	}

	pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
		self.arguments
			.iter()
			.find(|argument| argument.key == key)
			.map(|argument| &argument.value)
	}

	/// Insert or replace the argument stored under `key`.
	pub fn set(&mut self, key: impl Into<String>, value: AnnotationValue) {
		let key = key.into();
		self.has_parentheses = true;

		match self.arguments.iter_mut().find(|argument| argument.key == key) {
			Some(argument) => argument.value = value,
			None => {
				self.arguments.push(AnnotationArgument {
					key,
					value,
					positional: false,
				});
			}
		}
	}

	/// The key bare values are stored under.
	pub fn default_key(&self) -> &str {
		self.silent_key.as_deref().unwrap_or(DEFAULT_SILENT_KEY)
	}
}

impl Display for NestedAnnotation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(name) = &self.written_name {
			write!(f, "{name}")?;
		}

		if !self.has_parentheses && self.arguments.is_empty() {
			return Ok(());
		}

		write!(f, "(")?;
		for (index, argument) in self.arguments.iter().enumerate() {
			if index > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{argument}")?;
		}
		write!(f, ")")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationArgument {
	pub key: String,
	pub value: AnnotationValue,
	/// Whether the argument was written without `key=`.
	pub positional: bool,
}

impl Display for AnnotationArgument {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.positional {
			write!(f, "{}", self.value)
		} else {
			write!(f, "{}={}", self.key, self.value)
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(variant_size_differences)]
pub enum AnnotationValue {
	/// A quoted string, stored unescaped.
	String { value: String, quote: char },
	/// Any other scalar or collection, kept as written.
	Literal(String),
	Annotation(NestedAnnotation),
}

impl AnnotationValue {
	pub fn string(value: impl Into<String>) -> Self {
		Self::String {
			value: value.into(),
			quote: '"',
		}
	}

	/// The text of a string or literal value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String { value, .. } | Self::Literal(value) => Some(value),
			Self::Annotation(_) => None,
		}
	}
}

impl Display for AnnotationValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::String { value, quote: '\'' } => write!(f, "'{value}'"),
			Self::String { value, quote } => {
				let escaped = value.replace('\\', "\\\\").replace(*quote, &format!("\\{quote}"));
				write!(f, "{quote}{escaped}{quote}")
			}
			Self::Literal(value) => write!(f, "{value}"),
			Self::Annotation(annotation) => write!(f, "{annotation}"),
		}
	}
}

/// Parses annotation payloads for one parse session.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationReader<'a> {
	resolver: &'a dyn NameResolver,
	host: &'a HostScope,
	silent_keys: &'a SilentKeyMap,
}

impl<'a> AnnotationReader<'a> {
	pub fn new(
		resolver: &'a dyn NameResolver,
		host: &'a HostScope,
		silent_keys: &'a SilentKeyMap,
	) -> Self {
		Self {
			resolver,
			host,
			silent_keys,
		}
	}

	pub fn resolve(&self, tag_name: &str) -> Option<String> {
		self.resolver.resolve(tag_name, self.host)
	}

	/// Parse `payload` as `Name? ('(' arguments ')')?` for the annotation
	/// `name`.
	///
	/// The payload is lexed as a stream of its own. Returns `Ok(None)` when
	/// the payload does not have the shape of a call at all, and an error
	/// when it starts like one but is malformed.
	pub fn read(&self, name: &str, payload: &str) -> DocblockResult<Option<NestedAnnotation>> {
		let tokens = tokenize(payload);
		let mut cursor = tokens.cursor();
		cursor.skip_line_breaks();

		if cursor.is_at_end() {
			let mut annotation = NestedAnnotation::new(name);
			annotation.silent_key = self.silent_keys.get(name).map(ToString::to_string);
			return Ok(Some(annotation));
		}

		let written_name = match cursor.current_kind() {
			Some(TokenKind::Identifier) if cursor.peek_raw_kind() == Some(TokenKind::OpenParen) => {
				let written = cursor.current_text().to_string();
				cursor.next_raw();
				Some(written)
			}
			Some(TokenKind::OpenParen) => None,
			_ => return Ok(None),
		};

		let mut annotation = self.read_call(&mut cursor, name)?;
		annotation.written_name = written_name;
		annotation.raw = payload.trim().to_string();

		Ok(Some(annotation))
	}

	fn read_call(&self, cursor: &mut TokenCursor<'_>, name: &str) -> DocblockResult<NestedAnnotation> {
		let mut annotation = NestedAnnotation::new(name);
		annotation.silent_key = self.silent_keys.get(name).map(ToString::to_string);

		if !cursor.is_current(TokenKind::OpenParen) {
			return Ok(annotation);
		}

		annotation.has_parentheses = true;
		cursor.next();
		cursor.skip_line_breaks();

		while !cursor.is_current(TokenKind::CloseParen) {
			if cursor.is_at_end() {
				break;
			}

			let position = annotation.arguments.len();
			let argument = self.read_argument(cursor, &annotation, position)?;
			annotation.arguments.push(argument);
			cursor.skip_line_breaks();

			if !cursor.try_consume(TokenKind::Comma) {
				break;
			}
			cursor.skip_line_breaks();
		}

		cursor.consume(TokenKind::CloseParen)?;

		Ok(annotation)
	}

	fn read_argument(
		&self,
		cursor: &mut TokenCursor<'_>,
		annotation: &NestedAnnotation,
		position: usize,
	) -> DocblockResult<AnnotationArgument> {
		let is_keyed = cursor.is_current(TokenKind::Identifier) && {
			let mut lookahead = cursor.clone();
			lookahead.next();
			lookahead.is_current(TokenKind::Equal)
		};

		if is_keyed {
			let key = cursor.current_text().to_string();
			cursor.next();
			cursor.consume(TokenKind::Equal)?;
			cursor.skip_line_breaks();

			return Ok(AnnotationArgument {
				key,
				value: self.read_value(cursor)?,
				positional: false,
			});
		}

		let has_positional = annotation.arguments.iter().any(|argument| argument.positional);
		let key = if has_positional {
			position.to_string()
		} else {
			annotation.default_key().to_string()
		};

		Ok(AnnotationArgument {
			key,
			value: self.read_value(cursor)?,
			positional: true,
		})
	}

	fn read_value(&self, cursor: &mut TokenCursor<'_>) -> DocblockResult<AnnotationValue> {
		match cursor.current_kind() {
			Some(TokenKind::QuotedString) => {
				let text = cursor.current_text();
				cursor.next();
				Ok(AnnotationValue::String {
					value: unquote(text),
					quote: text.chars().next().unwrap_or('"'),
				})
			}
			Some(TokenKind::Tag) => self.read_nested(cursor).map(AnnotationValue::Annotation),
			Some(TokenKind::Identifier) if cursor.peek_raw_kind() == Some(TokenKind::OpenParen) => {
				self.read_nested(cursor).map(AnnotationValue::Annotation)
			}
			_ => Ok(AnnotationValue::Literal(read_literal(cursor))),
		}
	}

	/// `@Assert\NotBlank(message="...")` or `Length(max=10)` inside an
	/// argument list.
	fn read_nested(&self, cursor: &mut TokenCursor<'_>) -> DocblockResult<NestedAnnotation> {
		let start = cursor.index();
		let mut written = cursor.current_text().to_string();
		cursor.next_raw();

		if written.starts_with('@') && cursor.is_current(TokenKind::Identifier) {
			written.push_str(cursor.current_text());
			cursor.next_raw();
		}
		cursor.skip_whitespace();

		let name = self
			.resolve(&written)
			.unwrap_or_else(|| written.trim_start_matches('@').to_string());
		tracing::debug!(written = %written, name = %name, "resolved nested annotation");

		let mut annotation = self.read_call(cursor, &name)?;
		annotation.raw = cursor.tokens().text_between(start, cursor.index()).trim().to_string();
		annotation.written_name = Some(written);

		Ok(annotation)
	}
}

/// Collect a scalar or collection up to the next top level `,` or `)`.
fn read_literal(cursor: &mut TokenCursor<'_>) -> String {
	let mut depth = 0usize;
	let mut text = String::new();

	while let Some(token) = cursor.current() {
		match token.kind {
			TokenKind::Comma | TokenKind::CloseParen if depth == 0 => break,
			TokenKind::OpenParen | TokenKind::OpenCurly | TokenKind::OpenSquare => depth += 1,
			TokenKind::CloseParen | TokenKind::CloseCurly | TokenKind::CloseSquare => {
				depth = depth.saturating_sub(1);
			}
			_ => {}
		}

		if token.is(TokenKind::Eol) {
			text.push(' ');
		} else {
			text.push_str(&token.text);
		}
		cursor.next_raw();
	}

	text.trim().to_string()
}

fn unquote(text: &str) -> String {
	snailquote::unescape(text).unwrap_or_else(|_| text.trim_matches(['"', '\'']).to_string())
}

/// Build the error raised when a resolver claimed a tag without naming a
/// class for it.
pub(crate) fn unresolved(tag: &str, name: &str) -> DocblockError {
	DocblockError::UnresolvedAnnotation {
		tag: tag.to_string(),
		name: name.to_string(),
	}
}
