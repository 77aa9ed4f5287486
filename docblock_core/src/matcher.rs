use crate::DocblockResult;
use crate::ValueNode;
use crate::tokens::TokenCursor;
use crate::tokens::TokenKind;

/// A pluggable handler for tag payloads.
///
/// Matchers are consulted in registration order before any built-in value
/// kind. The first matcher whose [`matches`](TagValueMatcher::matches)
/// returns `true` builds the value. A matcher claiming a namespaced name such
/// as `@ORM\Column` also allows the parser to join `@ORM` and `\Column` into
/// one tag name.
pub trait TagValueMatcher: std::fmt::Debug {
	fn matches(&self, tag_name: &str) -> bool;

	/// Build the value from the cursor, which is positioned on the first
	/// token after the tag name. The matcher must not consume past the end of
	/// the tag's line unless its payload spans lines.
	fn create_from(&self, cursor: &mut TokenCursor<'_>) -> DocblockResult<ValueNode>;
}

/// Keeps the payload of the listed tags as raw text, bypassing the built-in
/// grammars and annotation resolution.
#[derive(Debug, Clone, Default)]
pub struct RawTagMatcher {
	names: Vec<String>,
}

impl RawTagMatcher {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			names: names.into_iter().map(Into::into).collect(),
		}
	}
}

impl TagValueMatcher for RawTagMatcher {
	fn matches(&self, tag_name: &str) -> bool {
		self.names
			.iter()
			.any(|name| name.eq_ignore_ascii_case(tag_name))
	}

	fn create_from(&self, cursor: &mut TokenCursor<'_>) -> DocblockResult<ValueNode> {
		Ok(ValueNode::Generic(read_payload(cursor)))
	}
}

/// Read a generic payload: everything up to the end of the line, continuing
/// onto following lines while a parenthesis opened in the payload is still
/// unclosed. Never consumes the closing marker.
///
/// Line breaks are kept as `\n` with the continuation decoration removed.
pub fn read_payload(cursor: &mut TokenCursor<'_>) -> String {
	let mut depth = 0usize;
	let mut text = String::new();
	let mut after_break = false;

	while let Some(token) = cursor.current() {
		match token.kind {
			TokenKind::CloseComment => break,
			TokenKind::Eol if depth == 0 => break,
			TokenKind::Eol => {
				text.push('\n');
				after_break = true;
				cursor.next_raw();
				continue;
			}
			TokenKind::OpenParen => depth += 1,
			TokenKind::CloseParen => depth = depth.saturating_sub(1),
			_ => {}
		}

		if after_break && token.is(TokenKind::HorizontalWs) {
			// One space separates the decoration from the content.
			text.push_str(token.text.strip_prefix(' ').unwrap_or(&token.text));
		} else {
			text.push_str(&token.text);
		}
		after_break = false;
		cursor.next_raw();
	}

	text.trim_end().to_string()
}
