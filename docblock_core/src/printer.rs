use std::cell::OnceCell;
use std::sync::LazyLock;

use regex::NoExpand;
use regex::Regex;

use crate::Baseline;
use crate::ChildNode;
use crate::DocTree;
use crate::DocblockError;
use crate::DocblockResult;
use crate::PositionRange;
use crate::TagNode;
use crate::spacing::resolve_separator;
use crate::tokens::TokenKind;
use crate::tokens::TokenStream;

/// Decoration placed before every synthesized line.
const LINE_PREFIX: &str = "\n * ";

static TRAILING_STAR_WHITESPACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)([^*])\*[ \t]+$").unwrap());
static CALLABLE_PADDING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"callable[ \t]+\(").unwrap());

/// Render `tree` back to comment text.
///
/// Children that are unchanged relative to `baseline` are copied from
/// `tokens` byte for byte, together with the decoration between them.
/// Removed children are elided with their line. New and changed children are
/// synthesized. Printing is pure: the same inputs always give the same
/// output.
pub fn print(tree: &DocTree, baseline: &Baseline, tokens: &TokenStream) -> DocblockResult<String> {
	PrintSession::new(tree, baseline, tokens).print()
}

/// State for one print call.
struct PrintSession<'a> {
	tree: &'a DocTree,
	baseline: &'a Baseline,
	tokens: &'a TokenStream,
	/// The full original text, searched by the spacing resolver.
	original: String,
	removed: OnceCell<Vec<PositionRange>>,
	/// Set once synthesized or elided content is part of the output.
	dirty: bool,
}

impl<'a> PrintSession<'a> {
	fn new(tree: &'a DocTree, baseline: &'a Baseline, tokens: &'a TokenStream) -> Self {
		Self {
			tree,
			baseline,
			tokens,
			original: tokens.text(),
			removed: OnceCell::new(),
			dirty: false,
		}
	}

	fn print(mut self) -> DocblockResult<String> {
		if self.tokens.is_empty() {
			return self.print_synthetic();
		}

		if !self.baseline.is_effectively_empty() && self.tree.is_effectively_empty() {
			tracing::debug!("every child was removed, printing nothing");
			return Ok(String::new());
		}

		self.dirty = !self.removed_ranges()?.is_empty();

		let mut output = String::new();
		let mut cursor = 0;
		let mut after_synthesized = false;

		for (position, child) in self.tree.children().iter().enumerate() {
			let Some(range) = child.range() else {
				if cursor == 0 {
					cursor = self.opening_end();
					self.flush(&mut output, 0, cursor, &[])?;
				}

				tracing::trace!(child = %child.label(), "synthesizing new child");
				self.dirty = true;
				output.push_str(LINE_PREFIX);
				output.push_str(&decorate(&self.render_new(child)?));
				after_synthesized = true;
				continue;
			};

			if range.start < cursor {
				// Moved before a child already printed.
				tracing::trace!(child = %child.label(), %range, "printing reordered child");
				self.dirty = true;
				output.push_str(LINE_PREFIX);
			} else {
				let deferred = self.deferred_ranges(position, cursor, range.start);
				let mut gap = String::new();
				self.flush(&mut gap, cursor, range.start, &deferred)?;

				// A synthesized line must not share its line with the next child.
				if after_synthesized && !gap.contains('\n') {
					output.push_str(LINE_PREFIX);
				} else {
					output.push_str(&gap);
				}
			}
			cursor = cursor.max(range.end);
			after_synthesized = false;

			if self.is_unchanged(child, range) {
				output.push_str(&self.tokens.slice(range));
			} else {
				tracing::trace!(child = %child.label(), %range, "synthesizing changed child");
				self.dirty = true;
				output.push_str(&decorate(&self.render_changed(child)?));
			}
		}

		self.flush_tail(&mut output, cursor)?;

		Ok(self.finish(output))
	}

	/// Output for a tree that was never backed by source text.
	fn print_synthetic(&self) -> DocblockResult<String> {
		if self.tree.is_empty() {
			return Ok(String::new());
		}

		let mut output = String::from("/**");
		for child in self.tree.children() {
			output.push_str(LINE_PREFIX);
			output.push_str(&decorate(&self.render_new(child)?));
		}
		output.push_str("\n */");

		Ok(self.post_process(output, true))
	}

	/// The index just past the opening marker.
	fn opening_end(&self) -> usize {
		self.tokens
			.iter()
			.position(|token| token.is(TokenKind::OpenComment))
			.map_or(0, |index| index + 1)
	}

	/// A range-backed child is unchanged when it equals the baseline child
	/// carrying the same range.
	fn is_unchanged(&self, child: &ChildNode, range: PositionRange) -> bool {
		self.baseline
			.children()
			.iter()
			.find(|original| original.range() == Some(range))
			.is_some_and(|original| original == child)
	}

	/// Baseline ranges that no working child carries, expanded backwards over
	/// the whitespace and line break in front of them. An expansion never
	/// reaches into the previous removed range.
	fn removed_ranges(&self) -> DocblockResult<&[PositionRange]> {
		if let Some(ranges) = self.removed.get() {
			return Ok(ranges);
		}

		let mut removed = vec![];
		for original in self.baseline.children() {
			let range = original
				.range()
				.ok_or_else(|| DocblockError::MissingPositionRange(original.label()))?;

			let is_kept = self
				.tree
				.children()
				.iter()
				.any(|child| child.range() == Some(range));

			if !is_kept {
				removed.push(range);
			}
		}
		removed.sort();

		let mut floor = 0;
		let mut ranges = Vec::with_capacity(removed.len());
		for range in removed {
			let expanded = self.expand(range, floor);
			tracing::debug!(%range, %expanded, "removed child");
			ranges.push(expanded);
			floor = range.end;
		}

		Ok(self.removed.get_or_init(|| ranges))
	}

	/// Extend `range` backwards over the whitespace and the line break in
	/// front of it, never below `floor`.
	fn expand(&self, range: PositionRange, floor: usize) -> PositionRange {
		let mut start = range.start;

		while start > floor && self.tokens.kind_at(start - 1) == Some(TokenKind::HorizontalWs) {
			start -= 1;
		}
		if start > floor && self.tokens.kind_at(start - 1) == Some(TokenKind::Eol) {
			start -= 1;
		}

		PositionRange::new(start, range.end)
	}

	/// Ranges of children that come after `position` in the working tree but
	/// lie in the source gap `cursor..until`. They are printed at their new
	/// place, so the gap must skip them.
	fn deferred_ranges(&self, position: usize, cursor: usize, until: usize) -> Vec<PositionRange> {
		self.tree.children()[position + 1..]
			.iter()
			.filter_map(ChildNode::range)
			.filter(|range| range.start >= cursor && range.end <= until)
			.map(|range| self.expand(range, cursor))
			.collect()
	}

	/// Copy tokens in `from..to` verbatim, skipping removed ranges and
	/// `skipped`.
	fn flush(
		&self,
		output: &mut String,
		from: usize,
		to: usize,
		skipped: &[PositionRange],
	) -> DocblockResult<()> {
		let removed = self.removed_ranges()?;
		let to = to.min(self.tokens.len());
		let mut index = from;

		while index < to {
			if let Some(range) = removed
				.iter()
				.chain(skipped)
				.find(|range| range.contains(index))
			{
				index = range.end;
				continue;
			}

			output.push_str(&self.tokens[index].text);
			index += 1;
		}

		Ok(())
	}

	/// Copy everything after the last printed child. Once the output is no
	/// longer verbatim, an empty line right above the closing marker is
	/// dropped.
	fn flush_tail(&self, output: &mut String, cursor: usize) -> DocblockResult<()> {
		let mut from = cursor;

		if self.dirty
			&& self.tokens.kind_at(from) == Some(TokenKind::Eol)
			&& self.tokens.kind_at(from + 1) == Some(TokenKind::Eol)
		{
			from += 1;
		}

		self.flush(output, from, self.tokens.len(), &[])
	}

	fn render_new(&self, child: &ChildNode) -> DocblockResult<String> {
		match child {
			ChildNode::Text(text) => Ok(text.text.clone()),
			ChildNode::Tag(tag) => restore_description(tag, tag.to_string()),
		}
	}

	/// Render a child that came from the source but no longer matches it.
	fn render_changed(&self, child: &ChildNode) -> DocblockResult<String> {
		let ChildNode::Tag(tag) = child else {
			return self.render_new(child);
		};

		let value = tag.value.to_string();
		let value = value.trim_start();

		if value.is_empty() {
			return Ok(tag.name.clone());
		}

		let separator = resolve_separator(&self.original, tag)?;
		restore_description(tag, format!("{}{separator}{value}", tag.name))
	}

	fn finish(&self, output: String) -> String {
		let dirty = self.dirty;
		self.post_process(output, dirty)
	}

	fn post_process(&self, mut output: String, dirty: bool) -> String {
		if output.is_empty() {
			return output;
		}

		if dirty {
			output = normalize_whitespace(&output);
		}

		output = complete_markers(output);

		if self.tree.is_single_line() {
			output = inline(&output);
		}

		output
	}
}

/// Put the description back exactly as it was written, including its line
/// breaks, when the tag recorded one.
fn restore_description(tag: &TagNode, rendered: String) -> DocblockResult<String> {
	let (Some(original), Some(description)) =
		(tag.original_description(), tag.value.description())
	else {
		return Ok(rendered);
	};

	if description.is_empty() {
		return Ok(rendered);
	}

	let pattern = description
		.split_whitespace()
		.map(regex::escape)
		.collect::<Vec<_>>()
		.join(r"\s+");
	let regex = Regex::new(&pattern)?;

	Ok(regex.replace(&rendered, NoExpand(original)).into_owned())
}

/// Turn embedded line breaks into decorated comment lines.
fn decorate(text: &str) -> String {
	text.replace('\n', LINE_PREFIX)
}

fn normalize_whitespace(output: &str) -> String {
	let output = TRAILING_STAR_WHITESPACE.replace_all(output, "$1*");
	let mut output = CALLABLE_PADDING
		.replace_all(&output, "callable(")
		.into_owned();

	// A multi-line comment closes on its own line.
	if output.contains('\n') {
		if let Some(position) = output.rfind("*/") {
			let line_start = output[..position].rfind('\n').map_or(0, |index| index + 1);

			if !output[line_start..position].trim().is_empty() {
				output = format!(
					"{}\n */{}",
					output[..position].trim_end(),
					&output[position + 2..]
				);
			}
		}
	}

	output
}

fn complete_markers(output: String) -> String {
	let trimmed = output.trim_start();
	let has_opening = ["//", "/*", "#"]
		.iter()
		.any(|marker| trimmed.starts_with(marker));

	let mut output = if has_opening {
		output
	} else if output.starts_with(char::is_whitespace) {
		format!("/**{output}")
	} else {
		format!("/** {output}")
	};

	if output.trim_start().starts_with("/*") && !output.contains("*/") {
		if output.contains('\n') {
			output.push_str("\n */");
		} else {
			output.push_str(" */");
		}
	}

	output
}

/// Collapse a comment onto one line: `/** @var int $a */`.
fn inline(output: &str) -> String {
	output
		.lines()
		.map(str::trim)
		.map(|line| {
			if line.starts_with("*/") {
				line
			} else {
				line.strip_prefix('*').unwrap_or(line).trim()
			}
		})
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}
