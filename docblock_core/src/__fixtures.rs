use crate::DocblockParser;
use crate::DocblockResult;
use crate::HostScope;
use crate::NameResolver;
use crate::ImportResolver;
use crate::SilentKeyMap;
use crate::TagValueMatcher;
use crate::ValueNode;
use crate::tokens::TokenCursor;

pub const THREE_TAGS: &str = "/**\n * @a\n * @b\n * @c\n */";

pub const METHOD_DOCBLOCK: &str = "/**
 * Finds a user.
 *
 * @param  int    $id      The identifier
 * @param  string ...$tags Tags to match
 * @return User|null
 * @throws \\RuntimeException when the store is down
 */";

pub const MULTILINE_DESCRIPTION: &str = "/**
 * @param int $id the identifier of the user,
 *   wrapped by hand
 * @return void
 */";

pub const ENTITY_DOCBLOCK: &str = "/**
 * @ORM\\Column(type=\"string\", length=255)
 * @Route(\"/home\", name=\"home\")
 */";

pub fn host_scope() -> HostScope {
	HostScope::new("App\\Controller")
		.with_use("ORM", "Doctrine\\ORM\\Mapping")
		.with_use("Assert", "Symfony\\Component\\Validator\\Constraints")
}

pub fn annotation_parser() -> DocblockParser {
	let resolver =
		ImportResolver::new().with_alias("Route", "Symfony\\Component\\Routing\\Annotation\\Route");
	let silent_keys: SilentKeyMap = [("Symfony\\Component\\Routing\\Annotation\\Route", "path")]
		.into_iter()
		.collect();

	DocblockParser::new()
		.with_resolver(resolver)
		.with_silent_keys(silent_keys)
		.with_host(host_scope())
}

/// Claims a tag but consumes nothing, leaving any parenthesis for the range
/// correction.
#[derive(Debug)]
pub struct NameOnlyMatcher(pub &'static str);

impl TagValueMatcher for NameOnlyMatcher {
	fn matches(&self, tag_name: &str) -> bool {
		tag_name == self.0
	}

	fn create_from(&self, _cursor: &mut TokenCursor<'_>) -> DocblockResult<ValueNode> {
		Ok(ValueNode::Generic(String::new()))
	}
}

/// Claims every tag without naming a class.
#[derive(Debug)]
pub struct EmptyNameResolver;

impl NameResolver for EmptyNameResolver {
	fn resolve(&self, _tag_name: &str, _host: &HostScope) -> Option<String> {
		Some(String::new())
	}
}
