use regex::Regex;

use crate::DocblockResult;
use crate::TagNode;
use crate::ValueNode;

/// The text to place between a tag name and its re-synthesized value.
///
/// The separator used in the original comment wins. Without one, structural
/// tags get a single space and everything else gets nothing, so that
/// `@Route("/")` stays glued to its parenthesis.
pub fn resolve_separator(original: &str, tag: &TagNode) -> DocblockResult<String> {
	let pattern = separator_pattern(tag);
	let regex = Regex::new(&pattern)?;

	if let Some(space) = regex
		.captures(original)
		.and_then(|captures| captures.name("space"))
	{
		return Ok(space.as_str().to_string());
	}

	let fallback = if tag.value.kind().is_structural() {
		" "
	} else {
		""
	};

	Ok(fallback.to_string())
}

fn separator_pattern(tag: &TagNode) -> String {
	let name = regex::escape(&tag.name);

	if !tag.value.kind().is_structural() {
		return format!(r"(?m){name}(?P<space>[ \t]*)(?:[^a-zA-Z0-9_\\\-]|$)");
	}

	let variable = match &tag.value {
		ValueNode::Param(param) => Some(param.name.as_str()),
		ValueNode::Var(var) => var.name.as_deref(),
		_ => None,
	};

	match variable {
		Some(variable) => {
			format!(
				r"(?m){name}(?P<space>[ \t]+)[^\n]*?{}",
				regex::escape(variable)
			)
		}
		None => format!(r"(?m){name}(?P<space>[ \t]+)"),
	}
}
