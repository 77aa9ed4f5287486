use std::fmt::Display;

use crate::DocblockError;
use crate::DocblockResult;
use crate::tokens::TokenCursor;
use crate::tokens::TokenKind;

/// A type expression found in `@param`, `@return`, `@var` and `@throws`
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[allow(variant_size_differences)]
pub enum TypeNode {
	/// `int`, `\Foo\Bar`, `$this`
	Identifier(String),
	/// A literal used as a type, e.g. `'foo'` or `42`.
	Const(String),
	/// `?int`
	Nullable(Box<TypeNode>),
	/// `int|string`
	Union(Vec<TypeNode>),
	/// `Foo&Bar`
	Intersection(Vec<TypeNode>),
	/// `int[]`
	Array(Box<TypeNode>),
	/// `array<int, string>`
	Generic {
		base: String,
		parameters: Vec<TypeNode>,
	},
	/// `callable(int, string): void`
	Callable {
		name: String,
		parameters: Vec<CallableParameter>,
		return_type: Box<TypeNode>,
	},
	/// `array{id: int, name?: string}`
	Shape { name: String, items: Vec<ShapeItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableParameter {
	pub r#type: TypeNode,
	pub is_reference: bool,
	pub is_variadic: bool,
	pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeItem {
	pub key: Option<String>,
	pub optional: bool,
	pub value: TypeNode,
}

impl TypeNode {
	pub fn identifier(name: impl Into<String>) -> Self {
		Self::Identifier(name.into())
	}

	/// Parse a standalone type expression such as `array<int, string>|null`.
	pub fn parse(source: &str) -> DocblockResult<Self> {
		let tokens = crate::lexer::tokenize(source);
		let mut cursor = tokens.cursor();
		let node = parse_type(&mut cursor)?;

		if !cursor.is_at_end() {
			return Err(unexpected(&cursor, TokenKind::Eol));
		}

		Ok(node)
	}

	fn needs_parentheses(&self) -> bool {
		matches!(
			self,
			Self::Union(_) | Self::Intersection(_) | Self::Nullable(_) | Self::Callable { .. }
		)
	}
}

impl Display for TypeNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Identifier(name) | Self::Const(name) => write!(f, "{name}"),
			Self::Nullable(inner) => write!(f, "?{inner}"),
			Self::Union(types) => write_joined(f, types, "|"),
			Self::Intersection(types) => write_joined(f, types, "&"),
			Self::Array(inner) if inner.needs_parentheses() => write!(f, "({inner})[]"),
			Self::Array(inner) => write!(f, "{inner}[]"),
			Self::Generic { base, parameters } => {
				write!(f, "{base}<")?;
				write_joined(f, parameters, ", ")?;
				write!(f, ">")
			}
			Self::Callable {
				name,
				parameters,
				return_type,
			} => {
				write!(f, "{name}(")?;
				write_joined(f, parameters, ", ")?;
				write!(f, "): {return_type}")
			}
			Self::Shape { name, items } => {
				write!(f, "{name}{{")?;
				write_joined(f, items, ", ")?;
				write!(f, "}}")
			}
		}
	}
}

impl Display for CallableParameter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.r#type)?;

		if self.is_reference || self.is_variadic || self.name.is_some() {
			write!(f, " ")?;
		}
		if self.is_reference {
			write!(f, "&")?;
		}
		if self.is_variadic {
			write!(f, "...")?;
		}
		if let Some(name) = &self.name {
			write!(f, "{name}")?;
		}

		Ok(())
	}
}

impl Display for ShapeItem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(key) = &self.key {
			let optional = if self.optional { "?" } else { "" };
			write!(f, "{key}{optional}: ")?;
		}

		write!(f, "{}", self.value)
	}
}

fn write_joined<T: Display>(
	f: &mut std::fmt::Formatter<'_>,
	items: &[T],
	separator: &str,
) -> std::fmt::Result {
	for (index, item) in items.iter().enumerate() {
		if index > 0 {
			write!(f, "{separator}")?;
		}
		write!(f, "{item}")?;
	}

	Ok(())
}

fn unexpected(cursor: &TokenCursor<'_>, expected: TokenKind) -> DocblockError {
	DocblockError::UnexpectedToken {
		expected,
		found: cursor
			.current()
			.map_or_else(|| "end of input".to_string(), |token| format!("`{}`", token.text)),
		index: cursor.index(),
	}
}

/// Parse a type expression starting at the cursor.
pub fn parse_type(cursor: &mut TokenCursor<'_>) -> DocblockResult<TypeNode> {
	let first = parse_postfix(cursor)?;

	if cursor.is_current(TokenKind::Union) {
		let mut types = vec![first];
		while cursor.try_consume(TokenKind::Union) {
			types.push(parse_postfix(cursor)?);
		}
		return Ok(TypeNode::Union(types));
	}

	if is_intersection(cursor) {
		let mut types = vec![first];
		while is_intersection(cursor) {
			cursor.next();
			types.push(parse_postfix(cursor)?);
		}
		return Ok(TypeNode::Intersection(types));
	}

	Ok(first)
}

/// `&` followed by `$name` or `...` is a by-reference parameter marker, not
/// an intersection.
fn is_intersection(cursor: &TokenCursor<'_>) -> bool {
	if !cursor.is_current(TokenKind::Intersection) {
		return false;
	}

	let mut lookahead = cursor.clone();
	lookahead.next();

	!matches!(
		lookahead.current_kind(),
		Some(TokenKind::Variable | TokenKind::Variadic) | None
	)
}

fn parse_postfix(cursor: &mut TokenCursor<'_>) -> DocblockResult<TypeNode> {
	let mut node = parse_atomic(cursor)?;

	while cursor.is_current(TokenKind::OpenSquare)
		&& !cursor.is_preceded_by_whitespace()
		&& cursor.peek_raw_kind() == Some(TokenKind::CloseSquare)
	{
		cursor.next_raw();
		cursor.next();
		node = TypeNode::Array(Box::new(node));
	}

	Ok(node)
}

fn parse_atomic(cursor: &mut TokenCursor<'_>) -> DocblockResult<TypeNode> {
	match cursor.current_kind() {
		Some(TokenKind::Nullable) => {
			cursor.next();
			Ok(TypeNode::Nullable(Box::new(parse_atomic(cursor)?)))
		}
		Some(TokenKind::OpenParen) => {
			cursor.next();
			let inner = parse_type(cursor)?;
			cursor.consume(TokenKind::CloseParen)?;
			Ok(inner)
		}
		Some(TokenKind::QuotedString | TokenKind::Number) => {
			let text = cursor.current_text().to_string();
			cursor.next();
			Ok(TypeNode::Const(text))
		}
		// `$this` is the only variable allowed in type position.
		Some(TokenKind::Variable) if cursor.current_text() == "$this" => {
			cursor.next();
			Ok(TypeNode::identifier("$this"))
		}
		Some(TokenKind::Identifier) => parse_named(cursor),
		_ => Err(unexpected(cursor, TokenKind::Identifier)),
	}
}

fn parse_named(cursor: &mut TokenCursor<'_>) -> DocblockResult<TypeNode> {
	let name = cursor.current_text().to_string();
	cursor.next_raw();

	let lower = name.to_ascii_lowercase();
	let node = match cursor.current_kind() {
		Some(TokenKind::OpenAngle) => {
			cursor.next();
			let mut parameters = vec![parse_type(cursor)?];
			while cursor.try_consume(TokenKind::Comma) {
				parameters.push(parse_type(cursor)?);
			}
			cursor.consume(TokenKind::CloseAngle)?;
			TypeNode::Generic {
				base: name,
				parameters,
			}
		}
		Some(TokenKind::OpenParen) if is_callable_name(&lower) => {
			cursor.next();
			let parameters = parse_callable_parameters(cursor)?;
			cursor.consume(TokenKind::CloseParen)?;
			cursor.consume(TokenKind::Colon)?;
			let return_type = parse_postfix(cursor)?;
			TypeNode::Callable {
				name,
				parameters,
				return_type: Box::new(return_type),
			}
		}
		Some(TokenKind::OpenCurly) if matches!(lower.as_str(), "array" | "list" | "object") => {
			cursor.next();
			let items = parse_shape_items(cursor)?;
			cursor.consume(TokenKind::CloseCurly)?;
			TypeNode::Shape { name, items }
		}
		_ => {
			// `next_raw` left any whitespace after the name unconsumed.
			if cursor.is_current(TokenKind::HorizontalWs) {
				cursor.next();
			}
			TypeNode::Identifier(name)
		}
	};

	Ok(node)
}

fn is_callable_name(lower: &str) -> bool {
	matches!(lower, "callable" | "closure" | "\\closure" | "pure-callable")
}

fn parse_callable_parameters(
	cursor: &mut TokenCursor<'_>,
) -> DocblockResult<Vec<CallableParameter>> {
	let mut parameters = vec![];

	if cursor.is_current(TokenKind::CloseParen) {
		return Ok(parameters);
	}

	loop {
		let r#type = parse_type(cursor)?;
		let is_reference = cursor.try_consume(TokenKind::Intersection);
		let is_variadic = cursor.try_consume(TokenKind::Variadic);
		let name = if cursor.is_current(TokenKind::Variable) {
			let name = cursor.current_text().to_string();
			cursor.next();
			Some(name)
		} else {
			None
		};

		parameters.push(CallableParameter {
			r#type,
			is_reference,
			is_variadic,
			name,
		});

		if !cursor.try_consume(TokenKind::Comma) {
			break;
		}
	}

	Ok(parameters)
}

fn parse_shape_items(cursor: &mut TokenCursor<'_>) -> DocblockResult<Vec<ShapeItem>> {
	let mut items = vec![];

	while !cursor.is_current(TokenKind::CloseCurly) && !cursor.is_at_end() {
		let mut lookahead = cursor.clone();
		let has_key = matches!(
			lookahead.current_kind(),
			Some(TokenKind::Identifier | TokenKind::QuotedString | TokenKind::Number)
		) && {
			lookahead.next();
			lookahead.try_consume(TokenKind::Nullable);
			lookahead.is_current(TokenKind::Colon)
		};

		let (key, optional) = if has_key {
			let key = cursor.current_text().to_string();
			cursor.next();
			let optional = cursor.try_consume(TokenKind::Nullable);
			cursor.consume(TokenKind::Colon)?;
			(Some(key), optional)
		} else {
			(None, false)
		};

		items.push(ShapeItem {
			key,
			optional,
			value: parse_type(cursor)?,
		});

		if !cursor.try_consume(TokenKind::Comma) {
			break;
		}
	}

	Ok(items)
}
