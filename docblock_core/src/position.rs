use std::fmt::Display;

/// A half-open interval of token indexes `[start, end)` tying a parsed node
/// back to its exact source slice.
///
/// Only nodes produced by the parser carry a range. Nodes built by hand, or
/// detached with [`TagNode::set_value_detached`](crate::TagNode::set_value_detached),
/// have none and are always synthesized when printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionRange {
	pub start: usize,
	pub end: usize,
}

impl PositionRange {
	/// Create a range, clamping `end` so that `start <= end`.
	pub fn new(start: usize, end: usize) -> Self {
		Self {
			start,
			end: end.max(start),
		}
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	pub fn contains(&self, index: usize) -> bool {
		self.start <= index && index < self.end
	}
}

impl Display for PositionRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}..{}", self.start, self.end)
	}
}
