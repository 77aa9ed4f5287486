use std::fmt::Display;

use derive_more::Deref;

use crate::DocblockError;
use crate::DocblockResult;
use crate::PositionRange;

/// The lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
	/// `/**`
	OpenComment,
	/// `*/`
	CloseComment,
	/// A line break together with the indentation and continuation `*` of the
	/// next line, e.g. `\n *`.
	Eol,
	/// ` ` | `\t`
	HorizontalWs,
	/// A tag marker, e.g. `@param`
	Tag,
	/// An identifier, possibly namespaced, e.g. `int` or `\Foo\Bar`
	Identifier,
	/// A variable, e.g. `$value`
	Variable,
	/// A single or double quoted string, e.g. `"/home"`
	QuotedString,
	/// An integer or decimal number.
	Number,
	/// `(`
	OpenParen,
	/// `)`
	CloseParen,
	/// `<`
	OpenAngle,
	/// `>`
	CloseAngle,
	/// `[`
	OpenSquare,
	/// `]`
	CloseSquare,
	/// `{`
	OpenCurly,
	/// `}`
	CloseCurly,
	/// `,`
	Comma,
	/// `:`
	Colon,
	/// `=`
	Equal,
	/// `|`
	Union,
	/// `&`
	Intersection,
	/// `?`
	Nullable,
	/// `...`
	Variadic,
	/// Anything else.
	Other,
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::OpenComment => "`/**`",
			Self::CloseComment => "`*/`",
			Self::Eol => "end of line",
			Self::HorizontalWs => "whitespace",
			Self::Tag => "tag",
			Self::Identifier => "identifier",
			Self::Variable => "variable",
			Self::QuotedString => "quoted string",
			Self::Number => "number",
			Self::OpenParen => "`(`",
			Self::CloseParen => "`)`",
			Self::OpenAngle => "`<`",
			Self::CloseAngle => "`>`",
			Self::OpenSquare => "`[`",
			Self::CloseSquare => "`]`",
			Self::OpenCurly => "`{`",
			Self::CloseCurly => "`}`",
			Self::Comma => "`,`",
			Self::Colon => "`:`",
			Self::Equal => "`=`",
			Self::Union => "`|`",
			Self::Intersection => "`&`",
			Self::Nullable => "`?`",
			Self::Variadic => "`...`",
			Self::Other => "text",
		};

		write!(f, "{name}")
	}
}

/// A single lexical unit of the original comment text.
///
/// Tokens are never mutated after lexing. The printer reproduces untouched
/// regions of a docblock by concatenating token text, so the text stored
/// here is the exact source slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub text: String,
	pub kind: TokenKind,
	/// Position of this token in its [`TokenStream`].
	pub index: usize,
}

impl Token {
	pub fn is(&self, kind: TokenKind) -> bool {
		self.kind == kind
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

/// The ordered tokens of one comment.
///
/// Concatenating the text of every token gives back the input that was
/// lexed, byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct TokenStream(Vec<Token>);

impl TokenStream {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self(tokens)
	}

	/// The text of the tokens in `start..end`. Out of bounds indexes are
	/// clamped to the stream length.
	pub fn text_between(&self, start: usize, end: usize) -> String {
		let end = end.min(self.0.len());
		let start = start.min(end);

		self.0[start..end]
			.iter()
			.map(|token| token.text.as_str())
			.collect()
	}

	/// The text covered by a [`PositionRange`].
	pub fn slice(&self, range: PositionRange) -> String {
		self.text_between(range.start, range.end)
	}

	/// The full text of the stream.
	pub fn text(&self) -> String {
		self.text_between(0, self.0.len())
	}

	pub fn kind_at(&self, index: usize) -> Option<TokenKind> {
		self.0.get(index).map(|token| token.kind)
	}

	pub fn cursor(&self) -> TokenCursor<'_> {
		TokenCursor::new(self)
	}
}

/// A read position into a [`TokenStream`].
///
/// Cursors are cheap to clone, which is how the parser takes a snapshot
/// before attempting a grammar that may fail. Horizontal whitespace is
/// skipped automatically every time the cursor moves.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
	tokens: &'a TokenStream,
	index: usize,
}

impl<'a> TokenCursor<'a> {
	pub fn new(tokens: &'a TokenStream) -> Self {
		let mut cursor = Self { tokens, index: 0 };
		cursor.skip_whitespace();
		cursor
	}

	pub fn tokens(&self) -> &'a TokenStream {
		self.tokens
	}

	/// Index of the current token.
	pub fn index(&self) -> usize {
		self.index
	}

	pub fn is_at_end(&self) -> bool {
		self.index >= self.tokens.len()
	}

	pub fn current(&self) -> Option<&'a Token> {
		self.tokens.get(self.index)
	}

	pub fn current_kind(&self) -> Option<TokenKind> {
		self.current().map(|token| token.kind)
	}

	/// Text of the current token, empty at the end of the stream.
	pub fn current_text(&self) -> &'a str {
		self.current().map_or("", |token| token.text.as_str())
	}

	pub fn is_current(&self, kind: TokenKind) -> bool {
		self.current_kind() == Some(kind)
	}

	/// Kind of the token immediately after the current one, without skipping
	/// whitespace.
	pub fn peek_raw_kind(&self) -> Option<TokenKind> {
		self.tokens.kind_at(self.index + 1)
	}

	pub fn is_preceded_by_whitespace(&self) -> bool {
		self.index > 0 && self.tokens.kind_at(self.index - 1) == Some(TokenKind::HorizontalWs)
	}

	/// Move to the next token, skipping any horizontal whitespace.
	pub fn next(&mut self) {
		if !self.is_at_end() {
			self.index += 1;
		}

		self.skip_whitespace();
	}

	/// Move past the current token without skipping the whitespace after it.
	pub fn next_raw(&mut self) {
		if !self.is_at_end() {
			self.index += 1;
		}
	}

	/// Consume a token of the given kind or fail.
	pub fn consume(&mut self, kind: TokenKind) -> DocblockResult<&'a Token> {
		match self.current() {
			Some(token) if token.kind == kind => {
				self.next();
				Ok(token)
			}
			found => {
				Err(DocblockError::UnexpectedToken {
					expected: kind,
					found: found.map_or_else(|| "end of input".to_string(), |t| format!("`{}`", t.text)),
					index: self.index,
				})
			}
		}
	}

	/// Consume a token of the given kind when present. Returns whether a token
	/// was consumed.
	pub fn try_consume(&mut self, kind: TokenKind) -> bool {
		if self.is_current(kind) {
			self.next();
			true
		} else {
			false
		}
	}

	/// The index just past the last consumed token that is not horizontal
	/// whitespace, never lower than `floor`.
	pub fn significant_end(&self, floor: usize) -> usize {
		let mut end = self.index.min(self.tokens.len());

		while end > floor && self.tokens.kind_at(end - 1) == Some(TokenKind::HorizontalWs) {
			end -= 1;
		}

		end
	}

	/// Move to `index` (clamped to the stream length), skipping whitespace.
	pub fn jump_to(&mut self, index: usize) {
		self.index = index.min(self.tokens.len());
		self.skip_whitespace();
	}

	pub fn skip_whitespace(&mut self) {
		while self.is_current(TokenKind::HorizontalWs) {
			self.index += 1;
		}
	}

	/// Skip line breaks and whitespace, used where a grammar may span lines.
	pub fn skip_line_breaks(&mut self) {
		while self.is_current(TokenKind::Eol) || self.is_current(TokenKind::HorizontalWs) {
			self.index += 1;
		}
	}

	/// Whether the cursor sits on a line break, the closing marker or the end
	/// of the stream.
	pub fn is_at_line_end(&self) -> bool {
		matches!(
			self.current_kind(),
			None | Some(TokenKind::Eol | TokenKind::CloseComment)
		)
	}
}
