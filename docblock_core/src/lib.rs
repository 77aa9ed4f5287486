//! `docblock_core` is a format-preserving engine for structured comments
//! (docblocks). It parses a `/** ... */` comment into a mutable tree, lets
//! callers edit that tree, and prints it back so that every byte that was not
//! touched is reproduced exactly while edited or new content is synthesized
//! with consistent formatting.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Comment text
//!   → Lexer (logos tokens, line decoration folded into end-of-line tokens)
//!   → Parser (tags and text lines with their token ranges, plus a baseline copy)
//!   → Caller edits (insert, remove, replace children, swap values)
//!   → Printer (verbatim slices for untouched children, synthesis for the rest)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `docblock.toml`: annotation aliases, silent keys and the host scope.
//! - [`tokens`] — The token stream and the cursor the parser and matchers read it with.
//!
//! ## Key Types
//!
//! - [`DocblockParser`] — Builds a [`ParsedDocblock`] from comment text.
//! - [`DocTree`] — The ordered children of a comment, either [`TextNode`] or [`TagNode`].
//! - [`ValueNode`] — A tag payload: generic text, `@param`/`@return`/`@var`/`@throws` values or a [`NestedAnnotation`].
//! - [`NameResolver`] — Decides which tags are annotations, given a [`HostScope`].
//! - [`TagValueMatcher`] — A pluggable handler consulted before the built-in value kinds.
//!
//! ## Quick Start
//!
//! ```rust
//! use docblock_core::TypeNode;
//! use docblock_core::ValueNode;
//! use docblock_core::parse;
//!
//! let mut parsed = parse("/** @var int $count */")?;
//! assert_eq!(parsed.print()?, "/** @var int $count */");
//!
//! let tag = parsed.tree.tags_mut().next().unwrap();
//! tag.value.set_type(TypeNode::parse("positive-int")?);
//! assert_eq!(parsed.print()?, "/** @var positive-int $count */");
//! # Ok::<(), docblock_core::DocblockError>(())
//! ```

pub use annotation::*;
pub use config::*;
pub use error::*;
pub use matcher::*;
pub use node::*;
pub use parser::*;
pub use position::*;
pub use printer::*;
pub use tokens::Token;
pub use tokens::TokenCursor;
pub use tokens::TokenKind;
pub use tokens::TokenStream;
pub use types::*;

mod annotation;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod matcher;
mod node;
mod parser;
mod position;
mod printer;
pub(crate) mod spacing;
pub mod tokens;
mod types;

pub use lexer::tokenize;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
