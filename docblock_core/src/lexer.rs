use logos::Logos;

use crate::tokens::Token;
use crate::tokens::TokenKind;
use crate::tokens::TokenStream;

/// Raw tokens produced by logos. Line breaks and continuation stars are
/// merged into [`TokenKind::Eol`] by the [`TokenWalker`].
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
	#[token("/**")]
	OpenComment,
	#[token("*/")]
	CloseComment,
	#[token("*")]
	Star,
	#[regex(r"\r?\n")]
	Newline,
	#[regex(r"[ \t]+")]
	Whitespace,
	#[regex(r"@[a-zA-Z_][a-zA-Z0-9_-]*")]
	Tag,
	#[regex(r"\\?[a-zA-Z_][a-zA-Z0-9_-]*(\\[a-zA-Z_][a-zA-Z0-9_-]*)*")]
	Identifier,
	#[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
	Variable,
	#[regex(r#""([^"\\\n]|\\.)*""#)]
	#[regex(r"'([^'\\\n]|\\.)*'")]
	QuotedString,
	#[regex(r"-?[0-9]+(\.[0-9]+)?")]
	Number,
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("<")]
	OpenAngle,
	#[token(">")]
	CloseAngle,
	#[token("[")]
	OpenSquare,
	#[token("]")]
	CloseSquare,
	#[token("{")]
	OpenCurly,
	#[token("}")]
	CloseCurly,
	#[token(",")]
	Comma,
	#[token(":")]
	Colon,
	#[token("=")]
	Equal,
	#[token("|")]
	Union,
	#[token("&")]
	Intersection,
	#[token("?")]
	Nullable,
	#[token("...")]
	Variadic,
}

impl RawToken {
	fn kind(self) -> TokenKind {
		match self {
			Self::OpenComment => TokenKind::OpenComment,
			Self::CloseComment => TokenKind::CloseComment,
			Self::Newline => TokenKind::Eol,
			Self::Whitespace => TokenKind::HorizontalWs,
			Self::Tag => TokenKind::Tag,
			Self::Identifier => TokenKind::Identifier,
			Self::Variable => TokenKind::Variable,
			Self::QuotedString => TokenKind::QuotedString,
			Self::Number => TokenKind::Number,
			Self::OpenParen => TokenKind::OpenParen,
			Self::CloseParen => TokenKind::CloseParen,
			Self::OpenAngle => TokenKind::OpenAngle,
			Self::CloseAngle => TokenKind::CloseAngle,
			Self::OpenSquare => TokenKind::OpenSquare,
			Self::CloseSquare => TokenKind::CloseSquare,
			Self::OpenCurly => TokenKind::OpenCurly,
			Self::CloseCurly => TokenKind::CloseCurly,
			Self::Comma => TokenKind::Comma,
			Self::Colon => TokenKind::Colon,
			Self::Equal => TokenKind::Equal,
			Self::Union => TokenKind::Union,
			Self::Intersection => TokenKind::Intersection,
			Self::Nullable => TokenKind::Nullable,
			Self::Variadic => TokenKind::Variadic,
			Self::Star => TokenKind::Other,
		}
	}
}

/// Walks the logos output and builds the final [`TokenStream`].
struct TokenWalker<'a> {
	/// The comment text being lexed.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// Collected tokens.
	tokens: Vec<Token>,
}

impl<'a> TokenWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			tokens: vec![],
		}
	}

	/// Get the text slice for the current raw token.
	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	fn peek(&self) -> Option<&Result<RawToken, ()>> {
		self.raw_tokens.get(self.cursor).map(|(result, _)| result)
	}

	fn push_token(&mut self, text: &str, kind: TokenKind) {
		// Unrecognised runs collapse into a single token.
		if kind == TokenKind::Other {
			if let Some(last) = self.tokens.last_mut() {
				if last.kind == TokenKind::Other {
					last.text.push_str(text);
					return;
				}
			}
		}

		let index = self.tokens.len();
		self.tokens.push(Token {
			text: text.to_string(),
			kind,
			index,
		});
	}

	/// A line break swallows the indentation of the next line and its leading
	/// `*`, so every continuation line starts with one `Eol` token.
	fn process_newline(&mut self) {
		let mut text = self.current_slice().to_string();
		self.cursor += 1;

		if matches!(self.peek(), Some(Ok(RawToken::Whitespace))) {
			text.push_str(self.current_slice());
			self.cursor += 1;
		}

		if matches!(self.peek(), Some(Ok(RawToken::Star))) {
			text.push_str(self.current_slice());
			self.cursor += 1;
		}

		self.push_token(&text, TokenKind::Eol);
	}

	fn process(&mut self) {
		while self.cursor < self.raw_tokens.len() {
			let slice = self.current_slice();

			match self.raw_tokens[self.cursor].0 {
				Ok(RawToken::Newline) => self.process_newline(),
				Ok(raw) => {
					self.push_token(slice, raw.kind());
					self.cursor += 1;
				}
				Err(()) => {
					self.push_token(slice, TokenKind::Other);
					self.cursor += 1;
				}
			}
		}
	}
}

/// Split comment text into a [`TokenStream`].
pub fn tokenize(source: &str) -> TokenStream {
	let mut walker = TokenWalker::new(source);
	walker.process();

	TokenStream::new(walker.tokens)
}
