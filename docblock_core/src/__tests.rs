use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;

#[rstest]
#[case::three_tags(THREE_TAGS)]
#[case::method(METHOD_DOCBLOCK)]
#[case::multiline_description(MULTILINE_DESCRIPTION)]
#[case::single_line("/** @var int $a */")]
#[case::empty_inline("/** */")]
#[case::empty_multiline("/**\n */")]
#[case::trailing_blank_line("/**\n * Some text\n *\n */")]
#[case::crlf("/**\r\n * @return int\r\n */")]
#[case::tabs("/**\n\t * @param\tint\t$a\n\t */")]
#[case::unterminated_paren("/** @Foo(bar */")]
#[case::odd_spacing("/**  @return   array<int,string>   the   values   */")]
fn round_trip(#[case] input: &str) -> DocblockResult<()> {
	let parsed = parse(input)?;
	assert_eq!(parsed.print()?, input);

	Ok(())
}

#[rstest]
#[case::entity(ENTITY_DOCBLOCK)]
#[case::nested("/** @Assert\\Valid(constraint=@Assert\\NotBlank(message=\"required\")) */")]
#[case::multiline_call("/**\n * @Route(\n *     \"/home\",\n *     name=\"home\"\n * )\n */")]
fn round_trip_with_annotations(#[case] input: &str) -> DocblockResult<()> {
	let parsed = annotation_parser().parse(input)?;
	assert_eq!(parsed.print()?, input);

	Ok(())
}

#[test]
fn reprint_is_idempotent() -> DocblockResult<()> {
	let mut parsed = parse(METHOD_DOCBLOCK)?;
	parsed.tree.remove_tags_named("@throws");
	parsed.tree.push(TagNode::new("@deprecated", ValueNode::generic("use find()")));

	let first = parsed.print()?;
	let second = parsed.print()?;
	assert_eq!(first, second);

	Ok(())
}

#[test]
fn removing_a_tag_elides_its_line() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	let removed = parsed.tree.remove(1);
	assert!(removed.is_some());

	insta::assert_snapshot!(parsed.print()?, @r"
/**
 * @a
 * @c
 */
");

	Ok(())
}

#[rstest]
#[case::first(0, "/**\n * @b\n * @c\n */")]
#[case::middle(1, "/**\n * @a\n * @c\n */")]
#[case::last(2, "/**\n * @a\n * @b\n */")]
fn removing_each_tag(#[case] index: usize, #[case] expected: &str) -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	parsed.tree.remove(index);
	assert_eq!(parsed.print()?, expected);

	Ok(())
}

#[test]
fn removing_adjacent_tags() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	parsed.tree.retain(|child| child.as_tag().is_some_and(|tag| tag.name == "@c"));
	assert_eq!(parsed.print()?, "/**\n * @c\n */");

	Ok(())
}

#[test]
fn removing_the_last_tag_of_a_description() -> DocblockResult<()> {
	let mut parsed = parse(METHOD_DOCBLOCK)?;
	let removed = parsed.tree.remove_tags_named("@throws");
	assert_eq!(removed, 1);

	let expected = "/**
 * Finds a user.
 *
 * @param  int    $id      The identifier
 * @param  string ...$tags Tags to match
 * @return User|null
 */";
	assert_eq!(parsed.print()?, expected);

	Ok(())
}

#[test]
fn removing_every_child_prints_nothing() -> DocblockResult<()> {
	let mut parsed = parse(METHOD_DOCBLOCK)?;
	parsed.tree.children_mut().clear();
	assert_eq!(parsed.print()?, "");

	Ok(())
}

#[test]
fn emptied_values_count_as_empty() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	for tag in parsed.tree.tags_mut() {
		tag.set_value(ValueNode::Empty);
	}

	assert!(parsed.tree.is_effectively_empty());
	assert_eq!(parsed.print()?, "");

	Ok(())
}

#[test]
fn synthesizes_a_new_comment() -> DocblockResult<()> {
	let mut tree = DocTree::new();
	tree.push(TagNode::new("@x", ValueNode::generic("y")));

	let output = print(&tree, &Baseline::default(), &TokenStream::default())?;
	assert_eq!(output, "/**\n * @x y\n */");

	Ok(())
}

#[test]
fn synthesized_output_is_normalized() -> DocblockResult<()> {
	let mut tree = DocTree::new();
	tree.push(TextNode::new("Summary."));
	tree.push(TextNode::new(""));
	tree.push(TagNode::new("@var", ValueNode::generic("callable (int): void")));

	let output = print(&tree, &Baseline::default(), &TokenStream::default())?;
	assert_eq!(output, "/**\n * Summary.\n *\n * @var callable(int): void\n */");

	Ok(())
}

#[test]
fn empty_synthetic_tree_prints_nothing() -> DocblockResult<()> {
	let output = print(&DocTree::new(), &Baseline::default(), &TokenStream::default())?;
	assert_eq!(output, "");

	Ok(())
}

#[rstest]
#[case::multiline("/**\n */", "/**\n * @x y\n */")]
#[case::inline("/** */", "/**\n * @x y\n */")]
#[case::after_tags(THREE_TAGS, "/**\n * @a\n * @b\n * @c\n * @x y\n */")]
fn appends_a_new_tag(#[case] input: &str, #[case] expected: &str) -> DocblockResult<()> {
	let mut parsed = parse(input)?;
	parsed.tree.push(TagNode::new("@x", ValueNode::generic("y")));
	assert_eq!(parsed.print()?, expected);

	Ok(())
}

#[test]
fn inserts_a_tag_before_existing_children() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	parsed.tree.insert(0, TagNode::new("@first", ValueNode::Empty));
	assert_eq!(parsed.print()?, "/**\n * @first\n * @a\n * @b\n * @c\n */");

	Ok(())
}

#[test]
fn editing_a_type_changes_only_the_type() -> DocblockResult<()> {
	let mut parsed = parse("/** @var int $a */")?;
	let tag = parsed.tree.tags_mut().next();
	assert!(tag.is_some_and(|tag| tag.value.set_type(TypeNode::identifier("string"))));

	assert_eq!(parsed.print()?, "/** @var string $a */");

	Ok(())
}

#[test]
fn editing_keeps_the_original_separator() -> DocblockResult<()> {
	let mut parsed = parse("/**\n * @return\tint the count\n */")?;
	let r#type = TypeNode::parse("positive-int")?;
	let tag = parsed.tree.tags_mut().next();
	assert!(tag.is_some_and(|tag| tag.value.set_type(r#type)));

	assert_eq!(parsed.print()?, "/**\n * @return\tpositive-int the count\n */");

	Ok(())
}

#[test]
fn detached_values_are_printed_in_place() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	if let Some(ChildNode::Tag(tag)) = parsed.tree.children_mut().get_mut(1) {
		tag.set_value_detached(ValueNode::generic("new"));
	}

	assert_eq!(parsed.print()?, "/**\n * @a\n * @b new\n * @c\n */");

	Ok(())
}

#[test]
fn editing_text_keeps_the_rest_verbatim() -> DocblockResult<()> {
	let mut parsed = parse(METHOD_DOCBLOCK)?;
	if let Some(ChildNode::Text(text)) = parsed.tree.children_mut().first_mut() {
		text.set_text("Finds a user by id.");
	}

	let expected = METHOD_DOCBLOCK.replace("Finds a user.", "Finds a user by id.");
	assert_eq!(parsed.print()?, expected);

	Ok(())
}

#[test]
fn restores_a_hand_wrapped_description() -> DocblockResult<()> {
	let mut parsed = parse(MULTILINE_DESCRIPTION)?;
	let param = parsed.tree.tags().next().cloned();
	let Some(param) = param else {
		panic!("expected a tag");
	};

	assert_eq!(
		param.value.description(),
		Some("the identifier of the user, wrapped by hand")
	);
	assert_eq!(
		param.original_description(),
		Some("the identifier of the user,\n  wrapped by hand")
	);

	let tag = parsed.tree.tags_mut().next();
	assert!(tag.is_some_and(|tag| tag.value.set_type(TypeNode::identifier("positive-int"))));

	let expected = "/**
 * @param positive-int $id the identifier of the user,
 *   wrapped by hand
 * @return void
 */";
	assert_eq!(parsed.print()?, expected);

	Ok(())
}

#[rstest]
#[case::swapped(|tree: &mut DocTree| tree.children_mut().swap(1, 2))]
#[case::moved_to_the_end(|tree: &mut DocTree| {
	if let Some(child) = tree.remove(1) {
		tree.push(child);
	}
})]
fn moved_children_are_printed_once(#[case] edit: fn(&mut DocTree)) -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	edit(&mut parsed.tree);

	let output = parsed.print()?;
	assert_eq!(output, "/**\n * @a\n * @c\n * @b\n */");
	assert_eq!(output, parsed.print()?);

	Ok(())
}

#[test]
fn moving_the_first_child_keeps_the_opening_line() -> DocblockResult<()> {
	let mut parsed = parse(THREE_TAGS)?;
	parsed.tree.children_mut().swap(0, 1);

	assert_eq!(parsed.print()?, "/**\n * @b\n * @a\n * @c\n */");

	Ok(())
}

#[rstest]
#[case::single_line("/** @var int $a */", "/**\n * @x y\n * @var int $a\n */")]
#[case::text_on_the_opening_line(
	"/** Some text\n * @var int $a\n */",
	"/**\n * @x y\n * Some text\n * @var int $a\n */"
)]
fn inserted_children_get_their_own_line(
	#[case] input: &str,
	#[case] expected: &str,
) -> DocblockResult<()> {
	let mut parsed = parse(input)?;
	parsed.tree.insert(0, TagNode::new("@x", ValueNode::generic("y")));

	let output = parsed.print()?;
	assert_eq!(output, expected);

	let reparsed = parse(&output)?;
	let names: Vec<_> = reparsed.tree.tags().map(|tag| tag.name.as_str()).collect();
	assert_eq!(names, vec!["@x", "@var"]);

	Ok(())
}

#[test]
fn single_line_trees_are_inlined() -> DocblockResult<()> {
	let mut parsed = parse("/**\n * @var int $a\n */")?;
	parsed.tree.set_single_line(true);
	assert_eq!(parsed.print()?, "/** @var int $a */");

	Ok(())
}

#[test]
fn parses_structural_tags() -> DocblockResult<()> {
	let parsed = parse(METHOD_DOCBLOCK)?;
	let tree = &parsed.tree;

	assert_eq!(tree.len(), 6);
	assert_eq!(
		tree.children()[1],
		ChildNode::Text(TextNode {
			text: String::new(),
			range: tree.children()[1].range(),
		})
	);

	let id = tree.param_value("$id");
	assert!(id.is_some_and(|param| param.description == "The identifier"));

	let tags = tree.param_value("tags");
	assert!(tags.is_some_and(|param| param.is_variadic && !param.is_reference));

	let ret = tree.return_value().map(|value| value.r#type.to_string());
	assert_eq!(ret.as_deref(), Some("User|null"));

	let throws = tree.first_value(ValueKind::Throws).map(ToString::to_string);
	assert_eq!(
		throws.as_deref(),
		Some("\\RuntimeException when the store is down")
	);
	assert_eq!(tree.tags_named("@param").count(), 2);
	assert!(!tree.is_effectively_empty());

	Ok(())
}

#[test]
fn records_token_ranges() -> DocblockResult<()> {
	let parsed = parse("/** @var int $a */")?;
	let tag = parsed.tree.tags().next().and_then(TagNode::range);

	assert_eq!(tag, Some(PositionRange::new(2, 7)));
	assert_eq!(parsed.tokens().slice(PositionRange::new(2, 7)), "@var int $a");

	Ok(())
}

#[test]
#[traced_test]
fn malformed_values_fall_back_to_generic() {
	let Ok(parsed) = parse("/** @param int */") else {
		panic!("expected the comment to parse");
	};
	let value = parsed.tree.tags().next().map(|tag| tag.value.clone());

	assert_eq!(value, Some(ValueNode::generic("int")));
	assert!(logs_contain("malformed tag value"));
	assert_eq!(parsed.print().ok().as_deref(), Some("/** @param int */"));
}

#[test]
fn resolves_the_default_key() -> DocblockResult<()> {
	let parser = DocblockParser::new().with_resolver(ImportResolver::new().with_alias("Foo", "App\\Foo"));

	let parsed = parser.parse("/** @Foo(\"bar\") */")?;
	let Some(ValueNode::Annotation(annotation)) = parsed.tree.first_value(ValueKind::Annotation)
	else {
		panic!("expected an annotation");
	};
	assert_eq!(annotation.name, "App\\Foo");
	assert_eq!(annotation.get("value"), Some(&AnnotationValue::string("bar")));

	let parsed = parser.parse("/** @Foo(key=\"bar\") */")?;
	let Some(ValueNode::Annotation(annotation)) = parsed.tree.first_value(ValueKind::Annotation)
	else {
		panic!("expected an annotation");
	};
	assert_eq!(annotation.get("key"), Some(&AnnotationValue::string("bar")));
	assert_eq!(annotation.get("value"), None);

	Ok(())
}

#[test]
fn resolves_configured_silent_keys() -> DocblockResult<()> {
	let parsed = annotation_parser().parse(ENTITY_DOCBLOCK)?;
	let tree = &parsed.tree;

	assert!(tree.has_annotation("Doctrine\\ORM\\Mapping\\Column"));
	assert!(tree.has_annotation("\\Symfony\\Component\\Routing\\Annotation\\Route"));

	let route = tree.tags_named("@Route").next().map(|tag| &tag.value);
	let Some(ValueNode::Annotation(route)) = route else {
		panic!("expected an annotation");
	};
	assert_eq!(route.silent_key.as_deref(), Some("path"));
	assert_eq!(route.get("path"), Some(&AnnotationValue::string("/home")));
	assert_eq!(route.get("name"), Some(&AnnotationValue::string("home")));

	let column = tree.tags_named("@ORM\\Column").next().map(|tag| &tag.value);
	let Some(ValueNode::Annotation(column)) = column else {
		panic!("expected an annotation");
	};
	assert_eq!(column.get("length"), Some(&AnnotationValue::Literal("255".into())));

	Ok(())
}

#[test]
fn resolves_nested_annotations() -> DocblockResult<()> {
	let parsed = annotation_parser()
		.parse("/** @Assert\\Valid(constraint=@Assert\\NotBlank(message=\"required\")) */")?;
	let Some(ValueNode::Annotation(valid)) = parsed.tree.first_value(ValueKind::Annotation) else {
		panic!("expected an annotation");
	};
	assert_eq!(valid.name, "Symfony\\Component\\Validator\\Constraints\\Valid");

	let Some(AnnotationValue::Annotation(not_blank)) = valid.get("constraint") else {
		panic!("expected a nested annotation");
	};
	assert_eq!(
		not_blank.name,
		"Symfony\\Component\\Validator\\Constraints\\NotBlank"
	);
	assert_eq!(not_blank.raw, "@Assert\\NotBlank(message=\"required\")");
	assert_eq!(
		not_blank.get("message"),
		Some(&AnnotationValue::string("required"))
	);

	Ok(())
}

#[test]
fn editing_an_annotation_argument() -> DocblockResult<()> {
	let mut parsed = annotation_parser().parse(ENTITY_DOCBLOCK)?;
	for tag in parsed.tree.tags_mut() {
		if let ValueNode::Annotation(annotation) = &mut tag.value {
			if tag.name == "@Route" {
				annotation.set("path", AnnotationValue::string("/start"));
			}
		}
	}

	insta::assert_snapshot!(parsed.print()?, @r#"
/**
 * @ORM\Column(type="string", length=255)
 * @Route("/start", name="home")
 */
"#);

	Ok(())
}

#[test]
fn unknown_tags_keep_their_payload() -> DocblockResult<()> {
	let parsed = parse(ENTITY_DOCBLOCK)?;
	let values: Vec<_> = parsed.tree.tags().map(|tag| tag.value.clone()).collect();

	assert_eq!(
		values,
		vec![
			ValueNode::generic("\\Column(type=\"string\", length=255)"),
			ValueNode::generic("(\"/home\", name=\"home\")"),
		]
	);

	Ok(())
}

#[test]
fn claimed_tags_with_other_payloads_keep_their_text() -> DocblockResult<()> {
	let config =
		DocblockConfig::from_toml("resolve_in_namespace = true\n[host]\nnamespace = \"App\"")?;
	let input = "/**\n * Does things.\n * @TODO fix this later\n * @return int\n */";
	let parsed = config.parser().parse(input)?;

	let todo = parsed.tree.tags_named("@TODO").next().map(|tag| &tag.value);
	assert_eq!(todo, Some(&ValueNode::generic("fix this later")));
	assert_eq!(
		parsed.tree.return_value().map(|value| value.r#type.to_string()),
		Some("int".to_string())
	);
	assert_eq!(parsed.print()?, input);

	let parsed = annotation_parser().parse("/** @Route \"/home\" */")?;
	let route = parsed.tree.tags().next().map(|tag| &tag.value);
	assert_eq!(route, Some(&ValueNode::generic("\"/home\"")));
	assert!(!parsed.tree.has_annotation("Symfony\\Component\\Routing\\Annotation\\Route"));

	Ok(())
}

#[test]
fn resolvers_must_name_a_class() {
	let parser = DocblockParser::new().with_resolver(EmptyNameResolver);
	let result = parser.parse("/** @Broken(1) */");

	assert!(matches!(
		result,
		Err(DocblockError::UnresolvedAnnotation { ref tag, ref name }) if tag == "@Broken" && name.is_empty()
	));
}

#[test]
fn matchers_decide_when_tag_names_join() -> DocblockResult<()> {
	let parser = DocblockParser::new().with_matcher(RawTagMatcher::new(["@ORM\\Id"]));
	let input = "/**\n * @ORM\\Id\n * @ORM\\Column\n */";
	let parsed = parser.parse(input)?;
	let names: Vec<_> = parsed.tree.tags().map(|tag| tag.name.as_str()).collect();

	assert_eq!(names, vec!["@ORM\\Id", "@ORM"]);
	assert_eq!(parsed.print()?, input);

	Ok(())
}

#[test]
fn matchers_take_precedence_over_structural_tags() -> DocblockResult<()> {
	let parser = DocblockParser::new().with_matcher(RawTagMatcher::new(["@return"]));
	let parsed = parser.parse("/** @return int */")?;

	assert_eq!(
		parsed.tree.first_value(ValueKind::Generic),
		Some(&ValueNode::generic("int"))
	);

	Ok(())
}

#[rstest]
#[case::matched("/** @Foo(bar) baz */", PositionRange::new(2, 6))]
#[case::clamped("/** @Foo(bar */", PositionRange::new(2, 6))]
fn corrects_the_end_of_brackets(
	#[case] input: &str,
	#[case] expected: PositionRange,
) -> DocblockResult<()> {
	let parser = DocblockParser::new().with_matcher(NameOnlyMatcher("@Foo"));
	let parsed = parser.parse(input)?;
	let range = parsed.tree.tags().next().and_then(TagNode::range);

	assert_eq!(range, Some(expected));
	assert_eq!(parsed.print()?, input);

	Ok(())
}

#[test]
fn rejects_text_without_an_opening_marker() {
	let result = parse("// @var int");
	assert!(matches!(
		result,
		Err(DocblockError::UnexpectedToken {
			expected: TokenKind::OpenComment,
			..
		})
	));
}

#[test]
fn tokens_reproduce_the_input() {
	let tokens = tokenize(METHOD_DOCBLOCK);
	assert_eq!(tokens.text(), METHOD_DOCBLOCK);

	let eol_count = tokens.iter().filter(|token| token.is(TokenKind::Eol)).count();
	assert_eq!(eol_count, 7);
}

#[test]
fn line_decoration_is_part_of_the_line_break() {
	let tokens = tokenize("/**\n * @a\n */");
	let kinds: Vec<_> = tokens.iter().map(|token| (token.kind, token.text.as_str())).collect();

	assert_eq!(
		kinds,
		vec![
			(TokenKind::OpenComment, "/**"),
			(TokenKind::Eol, "\n *"),
			(TokenKind::HorizontalWs, " "),
			(TokenKind::Tag, "@a"),
			(TokenKind::Eol, "\n "),
			(TokenKind::CloseComment, "*/"),
		]
	);
}

#[rstest]
#[case::generic("array<int, string>")]
#[case::nullable("?int")]
#[case::union_with_null("?int|null")]
#[case::array("int[]")]
#[case::grouped_array("(int|string)[]")]
#[case::intersection("Foo&Bar")]
#[case::callable("callable(int, string): void")]
#[case::shape("array{id: int, name?: string}")]
#[case::literal("'draft'|'published'")]
fn parses_types(#[case] input: &str) -> DocblockResult<()> {
	assert_eq!(TypeNode::parse(input)?.to_string(), input);

	Ok(())
}

#[test]
fn type_structure() -> DocblockResult<()> {
	let node = TypeNode::parse("array<int, string>|null")?;
	let expected = TypeNode::Union(vec![
		TypeNode::Generic {
			base: "array".into(),
			parameters: vec![TypeNode::identifier("int"), TypeNode::identifier("string")],
		},
		TypeNode::identifier("null"),
	]);
	assert_eq!(node, expected);

	Ok(())
}

#[test]
fn import_resolver_lookup_order() {
	let host = host_scope();
	let resolver = ImportResolver::new()
		.with_alias("Route", "Symfony\\Component\\Routing\\Annotation\\Route")
		.resolve_in_namespace(true);

	assert_eq!(
		resolver.resolve("@Route", &host).as_deref(),
		Some("Symfony\\Component\\Routing\\Annotation\\Route")
	);
	assert_eq!(
		resolver.resolve("@ORM\\Entity", &host).as_deref(),
		Some("Doctrine\\ORM\\Mapping\\Entity")
	);
	assert_eq!(
		resolver.resolve("@\\Foo\\Bar", &host).as_deref(),
		Some("Foo\\Bar")
	);
	assert_eq!(
		resolver.resolve("@Secured", &host).as_deref(),
		Some("App\\Controller\\Secured")
	);
	assert_eq!(resolver.resolve("@deprecated", &host), None);
}

#[test]
fn config_from_toml() -> DocblockResult<()> {
	let config = DocblockConfig::from_toml(
		r#"
raw_tags = ["@example"]

[annotations]
Route = "Symfony\\Component\\Routing\\Annotation\\Route"

[silent_keys]
"Symfony\\Component\\Routing\\Annotation\\Route" = "path"

[host]
namespace = "App\\Controller"
uses = { ORM = "Doctrine\\ORM\\Mapping" }
"#,
	)?;

	assert_eq!(config.raw_tags, vec!["@example".to_string()]);
	assert_eq!(
		config
			.silent_keys
			.get("Symfony\\Component\\Routing\\Annotation\\Route"),
		Some("path")
	);
	assert_eq!(config.host.namespace.as_deref(), Some("App\\Controller"));

	let parsed = config.parser().parse(ENTITY_DOCBLOCK)?;
	assert!(parsed.tree.has_annotation("Doctrine\\ORM\\Mapping\\Column"));
	assert!(parsed.tree.has_annotation("Symfony\\Component\\Routing\\Annotation\\Route"));

	Ok(())
}

#[test]
fn config_invalid_toml() {
	let result = DocblockConfig::from_toml("[annotations\n");
	assert!(matches!(result, Err(DocblockError::ConfigParse(_))));
}

#[rstest]
#[case::root("docblock.toml")]
#[case::hidden(".docblock.toml")]
#[case::config_dir(".config/docblock.toml")]
fn config_discovery(#[case] location: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join(location);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(&path, "[annotations]\nFoo = \"App\\\\Foo\"\n")?;

	assert_eq!(DocblockConfig::resolve_path(tmp.path()), Some(path));

	let config = DocblockConfig::load(tmp.path())?;
	let aliases = config.map(|config| config.annotations).unwrap_or_default();
	assert_eq!(aliases.get("Foo").map(String::as_str), Some("App\\Foo"));

	Ok(())
}

#[test]
fn config_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	assert!(DocblockConfig::load(tmp.path())?.is_none());

	Ok(())
}

#[test]
fn tracks_modifications_against_the_baseline() -> DocblockResult<()> {
	let mut parsed = parse("/** @var int $a */")?;
	assert!(!parsed.is_modified());
	assert_eq!(
		parsed.tree.var_value().and_then(|value| value.name.as_deref()),
		Some("$a")
	);

	if let Some(tag) = parsed.tree.tags_mut().next() {
		tag.value.set_type(TypeNode::identifier("string"));
	}
	assert!(parsed.is_modified());

	Ok(())
}

#[test]
fn host_scope_can_change_between_parses() -> DocblockResult<()> {
	let input = "/** @Assert\\NotBlank */";
	let mut parser = DocblockParser::new().with_resolver(ImportResolver::new());

	let parsed = parser.parse(input)?;
	assert!(!parsed.tree.has_annotation("Symfony\\Component\\Validator\\Constraints\\NotBlank"));

	parser.set_host(host_scope());
	let parsed = parser.parse(input)?;
	assert!(parsed.tree.has_annotation("Symfony\\Component\\Validator\\Constraints\\NotBlank"));
	assert_eq!(parsed.print()?, input);

	Ok(())
}
