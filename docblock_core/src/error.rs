use miette::Diagnostic;
use thiserror::Error;

use crate::TokenKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocblockError {
	#[error(transparent)]
	#[diagnostic(code(docblock::io_error))]
	Io(#[from] std::io::Error),

	#[error("expected {expected} at token {index}, found {found}")]
	#[diagnostic(
		code(docblock::unexpected_token),
		help("docblocks must open with `/**` and close with `*/`")
	)]
	UnexpectedToken {
		expected: TokenKind,
		found: String,
		index: usize,
	},

	#[error("node `{0}` was expected to carry a position range")]
	#[diagnostic(
		code(docblock::missing_position_range),
		help("this is a bug in the docblock engine, please report it")
	)]
	MissingPositionRange(String),

	#[error("tag `{tag}` was claimed by the name resolver but resolved to `{name}`, which names no class")]
	#[diagnostic(
		code(docblock::unresolved_annotation),
		help("a `NameResolver` must return a non-empty class name for every tag it claims")
	)]
	UnresolvedAnnotation { tag: String, name: String },

	#[error("invalid pattern: {0}")]
	#[diagnostic(code(docblock::pattern))]
	Pattern(#[from] regex::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docblock::config_parse),
		help("check that docblock.toml is valid TOML with [annotations], [silent_keys] and/or [host] sections")
	)]
	ConfigParse(String),
}

pub type DocblockResult<T> = Result<T, DocblockError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
