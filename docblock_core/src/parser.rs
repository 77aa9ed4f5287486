use derive_more::Deref;

use crate::AnnotationReader;
use crate::ChildNode;
use crate::DocTree;
use crate::DocblockResult;
use crate::HostScope;
use crate::NameResolver;
use crate::NoopResolver;
use crate::ParamValue;
use crate::PositionRange;
use crate::ReturnValue;
use crate::SilentKeyMap;
use crate::TagNode;
use crate::TagValueMatcher;
use crate::TextNode;
use crate::ThrowsValue;
use crate::ValueKind;
use crate::ValueNode;
use crate::VarValue;
use crate::annotation::unresolved;
use crate::lexer::tokenize;
use crate::matcher::read_payload;
use crate::tokens::TokenCursor;
use crate::tokens::TokenKind;
use crate::tokens::TokenStream;
use crate::types::parse_type;

/// Parse a docblock with no matchers and no name resolution.
pub fn parse(text: impl AsRef<str>) -> DocblockResult<ParsedDocblock> {
	DocblockParser::default().parse(text)
}

/// The tag kind parsed with the built-in type grammar, if any.
pub fn structural_kind(tag_name: &str) -> Option<ValueKind> {
	let kind = match tag_name.to_ascii_lowercase().as_str() {
		"@param" | "@phpstan-param" | "@psalm-param" => ValueKind::Param,
		"@return" | "@phpstan-return" | "@psalm-return" => ValueKind::Return,
		"@var" | "@phpstan-var" | "@psalm-var" => ValueKind::Var,
		"@throws" | "@phpstan-throws" => ValueKind::Throws,
		_ => return None,
	};

	Some(kind)
}

/// A read-only copy of the tree taken right after parsing. The printer diffs
/// the working tree against it to find removed children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Baseline(DocTree);

impl Baseline {
	pub fn snapshot(tree: &DocTree) -> Self {
		Self(tree.clone())
	}
}

/// The result of a parse: the working tree, its baseline and the tokens the
/// tree points into.
#[derive(Debug, Clone)]
pub struct ParsedDocblock {
	pub tree: DocTree,
	baseline: Baseline,
	tokens: TokenStream,
}

impl ParsedDocblock {
	pub fn baseline(&self) -> &Baseline {
		&self.baseline
	}

	pub fn tokens(&self) -> &TokenStream {
		&self.tokens
	}

	/// Render the working tree, preserving untouched source text.
	pub fn print(&self) -> DocblockResult<String> {
		crate::print(&self.tree, &self.baseline, &self.tokens)
	}

	/// Whether the working tree still equals the parsed tree.
	pub fn is_modified(&self) -> bool {
		self.tree != *self.baseline
	}
}

/// Builds docblock trees from comment text.
///
/// ```rust
/// use docblock_core::DocblockParser;
/// use docblock_core::HostScope;
/// use docblock_core::ImportResolver;
///
/// let parser = DocblockParser::new()
/// 	.with_resolver(ImportResolver::new())
/// 	.with_host(HostScope::default().with_use("ORM", "Doctrine\\ORM\\Mapping"));
/// let parsed = parser.parse("/** @ORM\\Column(type=\"string\") */")?;
///
/// assert!(parsed.tree.has_annotation("Doctrine\\ORM\\Mapping\\Column"));
/// # Ok::<(), docblock_core::DocblockError>(())
/// ```
#[derive(Debug, Default)]
pub struct DocblockParser {
	matchers: Vec<Box<dyn TagValueMatcher>>,
	resolver: Option<Box<dyn NameResolver>>,
	silent_keys: SilentKeyMap,
	host: HostScope,
}

impl DocblockParser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a matcher. Matchers are tried in registration order.
	pub fn with_matcher(mut self, matcher: impl TagValueMatcher + 'static) -> Self {
		self.matchers.push(Box::new(matcher));
		self
	}

	pub fn with_resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
		self.resolver = Some(Box::new(resolver));
		self
	}

	pub fn with_silent_keys(mut self, silent_keys: SilentKeyMap) -> Self {
		self.silent_keys = silent_keys;
		self
	}

	pub fn with_host(mut self, host: HostScope) -> Self {
		self.host = host;
		self
	}

	/// Change the host scope between parses, e.g. when moving to another
	/// class in the same file.
	pub fn set_host(&mut self, host: HostScope) {
		self.host = host;
	}

	pub fn host(&self) -> &HostScope {
		&self.host
	}

	pub fn parse(&self, text: impl AsRef<str>) -> DocblockResult<ParsedDocblock> {
		let tokens = tokenize(text.as_ref());
		let tree = ParseSession::new(self, &tokens).parse_tree()?;
		let baseline = Baseline::snapshot(&tree);

		Ok(ParsedDocblock {
			tree,
			baseline,
			tokens,
		})
	}

	fn annotations(&self) -> AnnotationReader<'_> {
		let resolver: &dyn NameResolver = match &self.resolver {
			Some(resolver) => resolver.as_ref(),
			None => &NoopResolver,
		};

		AnnotationReader::new(resolver, &self.host, &self.silent_keys)
	}
}

/// State for a single parse call.
struct ParseSession<'a> {
	parser: &'a DocblockParser,
	annotations: AnnotationReader<'a>,
	tokens: &'a TokenStream,
	cursor: TokenCursor<'a>,
}

impl<'a> ParseSession<'a> {
	fn new(parser: &'a DocblockParser, tokens: &'a TokenStream) -> Self {
		Self {
			parser,
			annotations: parser.annotations(),
			tokens,
			cursor: tokens.cursor(),
		}
	}

	fn parse_tree(&mut self) -> DocblockResult<DocTree> {
		self.cursor.consume(TokenKind::OpenComment)?;
		self.cursor.try_consume(TokenKind::Eol);

		let mut children = vec![];

		if !self.is_at_close() {
			children.push(self.parse_child()?);
		}

		while !self.is_at_close() {
			if !self.cursor.try_consume(TokenKind::Eol) {
				// A matcher stopped before the end of its line.
				children.push(self.parse_text()?);
				continue;
			}

			if self.is_at_close() {
				break;
			}

			children.push(self.parse_child()?);
		}

		self.cursor.try_consume(TokenKind::CloseComment);

		Ok(DocTree::with_children(children))
	}

	fn is_at_close(&self) -> bool {
		self.cursor.is_at_end() || self.cursor.is_current(TokenKind::CloseComment)
	}

	fn parse_child(&mut self) -> DocblockResult<ChildNode> {
		if self.cursor.is_current(TokenKind::Tag) {
			self.parse_tag()
		} else {
			self.parse_text()
		}
	}

	fn parse_text(&mut self) -> DocblockResult<ChildNode> {
		let start = self.cursor.index();

		while !self.cursor.is_at_line_end() {
			self.cursor.next_raw();
		}

		let range = PositionRange::new(start, self.cursor.significant_end(start));
		let mut node = TextNode::new(self.tokens.slice(range).trim());
		node.range = Some(range);

		Ok(node.into())
	}

	fn parse_tag(&mut self) -> DocblockResult<ChildNode> {
		let start = self.cursor.index();
		let name = self.parse_tag_name();
		let (value, original_description) = self.parse_tag_value(&name)?;

		let end = self.end_of_bracket(self.cursor.significant_end(start + 1));
		if end > self.cursor.index() {
			self.cursor.jump_to(end);
		}

		tracing::trace!(tag = %name, start, end, kind = ?value.kind(), "parsed tag");

		let mut node = TagNode::new(name, value);
		node.range = Some(PositionRange::new(start, end));
		node.original_description = original_description;

		Ok(node.into())
	}

	/// The tag token, joined with a directly following namespaced identifier
	/// when a matcher or the name resolver claims the joined name.
	fn parse_tag_name(&mut self) -> String {
		let tag = self.cursor.current_text().to_string();
		self.cursor.next_raw();

		if self.cursor.is_current(TokenKind::Identifier) {
			let joined = format!("{tag}{}", self.cursor.current_text());

			if self.claims(&joined) {
				self.cursor.next();
				return joined;
			}
		}

		self.cursor.skip_whitespace();
		tag
	}

	fn claims(&self, tag_name: &str) -> bool {
		self.parser
			.matchers
			.iter()
			.any(|matcher| matcher.matches(tag_name))
			|| self.annotations.resolve(tag_name).is_some()
	}

	fn parse_tag_value(&mut self, name: &str) -> DocblockResult<(ValueNode, Option<String>)> {
		let snapshot = self.cursor.clone();

		if let Some(matcher) = self.parser.matchers.iter().find(|m| m.matches(name)) {
			match matcher.create_from(&mut self.cursor) {
				Ok(value) => return Ok((value, None)),
				Err(error) => {
					tracing::debug!(tag = %name, %error, "matcher failed, keeping raw payload");
					self.cursor = snapshot;
				}
			}
		} else if let Some(kind) = structural_kind(name) {
			match self.parse_structural(kind) {
				Ok(parsed) => return Ok(parsed),
				Err(error) => {
					tracing::debug!(tag = %name, %error, "malformed tag value, keeping raw payload");
					self.cursor = snapshot;
				}
			}
		}

		self.parse_generic(name).map(|value| (value, None))
	}

	fn parse_generic(&mut self, name: &str) -> DocblockResult<ValueNode> {
		let payload = read_payload(&mut self.cursor);

		let Some(resolved) = self.annotations.resolve(name) else {
			return Ok(ValueNode::Generic(payload));
		};

		// A resolver must name a class for every tag it claims.
		if resolved.trim_matches('\\').is_empty() {
			return Err(unresolved(name, &resolved));
		}

		match self.annotations.read(&resolved, &payload) {
			Ok(Some(annotation)) => {
				tracing::debug!(tag = %name, name = %resolved, "resolved annotation");
				Ok(ValueNode::Annotation(annotation))
			}
			Ok(None) => {
				tracing::debug!(
					tag = %name,
					name = %resolved,
					"payload is not a call, keeping raw payload"
				);
				Ok(ValueNode::Generic(payload))
			}
			Err(error) => {
				tracing::debug!(tag = %name, %error, "malformed annotation, keeping raw payload");
				Ok(ValueNode::Generic(payload))
			}
		}
	}

	fn parse_structural(&mut self, kind: ValueKind) -> DocblockResult<(ValueNode, Option<String>)> {
		let value = match kind {
			ValueKind::Param => {
				let r#type = if self.starts_with_variable() {
					None
				} else {
					Some(parse_type(&mut self.cursor)?)
				};
				let is_reference = self.cursor.try_consume(TokenKind::Intersection);
				let is_variadic = self.cursor.try_consume(TokenKind::Variadic);
				let name = self.cursor.consume(TokenKind::Variable)?.text.clone();
				self.expect_separated()?;

				ValueNode::Param(ParamValue {
					r#type,
					is_reference,
					is_variadic,
					name,
					description: String::new(),
				})
			}
			ValueKind::Return => {
				let r#type = parse_type(&mut self.cursor)?;
				self.expect_separated()?;

				ValueNode::Return(ReturnValue {
					r#type,
					description: String::new(),
				})
			}
			ValueKind::Var => {
				let r#type = if self.cursor.is_current(TokenKind::Variable) {
					None
				} else {
					Some(parse_type(&mut self.cursor)?)
				};
				let name = if self.cursor.is_current(TokenKind::Variable) {
					let name = self.cursor.current_text().to_string();
					self.cursor.next();
					Some(name)
				} else {
					None
				};
				self.expect_separated()?;

				ValueNode::Var(VarValue {
					r#type,
					name,
					description: String::new(),
				})
			}
			ValueKind::Throws => {
				let r#type = parse_type(&mut self.cursor)?;
				self.expect_separated()?;

				ValueNode::Throws(ThrowsValue {
					r#type,
					description: String::new(),
				})
			}
			ValueKind::Generic | ValueKind::Annotation | ValueKind::Empty => {
				return Ok((ValueNode::Generic(read_payload(&mut self.cursor)), None));
			}
		};

		let (description, original) = self.parse_description();
		let value = match value {
			ValueNode::Param(param) => ValueNode::Param(ParamValue { description, ..param }),
			ValueNode::Return(ret) => ValueNode::Return(ReturnValue { description, ..ret }),
			ValueNode::Var(var) => ValueNode::Var(VarValue { description, ..var }),
			ValueNode::Throws(throws) => ValueNode::Throws(ThrowsValue { description, ..throws }),
			other => other,
		};

		Ok((value, original))
	}

	/// `$name`, `&$name`, `...$name` and `&...$name` all start a parameter
	/// without a type.
	fn starts_with_variable(&self) -> bool {
		let mut lookahead = self.cursor.clone();
		lookahead.try_consume(TokenKind::Intersection);
		lookahead.try_consume(TokenKind::Variadic);
		lookahead.is_current(TokenKind::Variable)
	}

	/// A structural value must be followed by whitespace or the end of its
	/// line, otherwise `@return int.foo` would parse as `int`.
	fn expect_separated(&self) -> DocblockResult<()> {
		if self.cursor.is_at_line_end() || self.cursor.is_preceded_by_whitespace() {
			return Ok(());
		}

		Err(crate::DocblockError::UnexpectedToken {
			expected: TokenKind::HorizontalWs,
			found: format!("`{}`", self.cursor.current_text()),
			index: self.cursor.index(),
		})
	}

	/// The rest of the line, continued onto following lines that are not
	/// blank, do not start a tag and do not close the comment.
	///
	/// Returns the normalized description and, when it differs, the text as
	/// written.
	fn parse_description(&mut self) -> (String, Option<String>) {
		let first = self.read_line();

		if first.is_empty() {
			return (String::new(), None);
		}

		let mut lines = vec![first];

		while self.cursor.is_current(TokenKind::Eol) {
			let mut lookahead = self.cursor.clone();
			lookahead.next();

			if lookahead.is_at_end()
				|| matches!(
					lookahead.current_kind(),
					Some(TokenKind::Eol | TokenKind::CloseComment | TokenKind::Tag)
				) {
				break;
			}

			// Keep the indentation of hand-wrapped lines past the single space
			// that follows the continuation `*`.
			let line_start = self.cursor.index() + 1;
			self.cursor = lookahead;
			lines.push(self.read_continuation(line_start));
		}

		let description = lines
			.iter()
			.flat_map(|line| line.split_whitespace())
			.collect::<Vec<_>>()
			.join(" ");
		let written = lines.join("\n");
		let original = (written != description).then_some(written);

		(description, original)
	}

	fn read_line(&mut self) -> String {
		let start = self.cursor.index();

		while !self.cursor.is_at_line_end() {
			self.cursor.next_raw();
		}

		self.tokens
			.text_between(start, self.cursor.index())
			.trim()
			.to_string()
	}

	fn read_continuation(&mut self, start: usize) -> String {
		while !self.cursor.is_at_line_end() {
			self.cursor.next_raw();
		}

		let line = self.tokens.text_between(start, self.cursor.index());
		line.strip_prefix(' ').unwrap_or(line.as_str()).trim_end().to_string()
	}

	/// When the token at `end` opens a parenthesis, extend `end` past the
	/// matching close. Without a match, clamp to the last token.
	fn end_of_bracket(&self, end: usize) -> usize {
		if self.tokens.kind_at(end) != Some(TokenKind::OpenParen) {
			return end;
		}

		let mut depth = 0usize;
		for index in end..self.tokens.len() {
			match self.tokens.kind_at(index) {
				Some(TokenKind::OpenParen) => depth += 1,
				Some(TokenKind::CloseParen) => {
					depth -= 1;
					if depth == 0 {
						return index + 1;
					}
				}
				_ => {}
			}
		}

		tracing::debug!(end, "unterminated parenthesis, clamping range");
		self.tokens.len().saturating_sub(1)
	}
}
