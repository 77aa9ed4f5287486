use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use docblock_cli::Commands;
use docblock_cli::DocblockCli;
use docblock_cli::OutputFormat;
use docblock_core::DocblockConfig;
use docblock_core::DocblockParser;
use docblock_core::ParsedDocblock;
use docblock_core::TagNode;
use docblock_core::TypeNode;
use docblock_core::ValueNode;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = DocblockCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Check { diff }) => run_check(&args, *diff),
		Some(Commands::Tags { format }) => run_tags(&args, *format),
		Some(Commands::Remove { tag, diff }) => run_remove(&args, tag, *diff),
		Some(Commands::SetType {
			tag,
			r#type,
			var,
			diff,
		}) => run_set_type(&args, tag, r#type, var.as_deref(), *diff),
		None => {
			eprintln!("No subcommand specified. Run `docblock --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<docblock_core::DocblockError>() {
			Ok(docblock_err) => {
				let report: miette::Report = (*docblock_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `DOCBLOCK_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("DOCBLOCK_LOG").unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"docblock={default_level},docblock_core={default_level}"
		))
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.with_ansi(color_enabled())
		.init();
}

fn resolve_root(args: &DocblockCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Build the parser from the discovered config, or the default parser when
/// there is none.
fn load_parser(args: &DocblockCli) -> Result<DocblockParser, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let parser = match DocblockConfig::load(&root)? {
		Some(config) => config.parser(),
		None => {
			tracing::debug!(root = %root.display(), "no config found, using defaults");
			DocblockParser::new()
		}
	};

	Ok(parser)
}

/// Read the comment from `--file` or stdin. Trailing line breaks after the
/// closing marker are not part of the comment.
fn read_input(args: &DocblockCli) -> Result<String, Box<dyn std::error::Error>> {
	let content = match &args.file {
		Some(path) => std::fs::read_to_string(path)?,
		None => {
			let mut content = String::new();
			std::io::stdin().read_to_string(&mut content)?;
			content
		}
	};

	Ok(content.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_input(args: &DocblockCli) -> Result<(String, ParsedDocblock), Box<dyn std::error::Error>> {
	let parser = load_parser(args)?;
	let input = read_input(args)?;
	let parsed = parser.parse(&input)?;

	Ok((input, parsed))
}

fn run_check(args: &DocblockCli, show_diff: bool) -> CliResult {
	let (input, parsed) = parse_input(args)?;
	let printed = parsed.print()?;

	if printed == input {
		println!(
			"{} docblock is printed back unchanged.",
			colored!("✓", green)
		);
		return Ok(());
	}

	eprintln!(
		"{} docblock is not printed back unchanged.",
		colored!("✗", red)
	);
	if show_diff {
		print_diff(&input, &printed);
	}
	process::exit(1);
}

#[derive(Serialize)]
struct TagEntry {
	name: String,
	kind: String,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	r#type: Option<String>,
	value: String,
	/// Token range of the tag in the input, e.g. `2..7`.
	#[serde(skip_serializing_if = "Option::is_none")]
	range: Option<String>,
}

impl From<&TagNode> for TagEntry {
	fn from(tag: &TagNode) -> Self {
		Self {
			name: tag.name.clone(),
			kind: format!("{:?}", tag.value.kind()).to_lowercase(),
			r#type: tag.value.r#type().map(ToString::to_string),
			value: tag.value.to_string(),
			range: tag.range().map(|range| range.to_string()),
		}
	}
}

fn run_tags(args: &DocblockCli, format: OutputFormat) -> CliResult {
	let (_, parsed) = parse_input(args)?;
	let entries: Vec<TagEntry> = parsed.tree.tags().map(TagEntry::from).collect();

	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		OutputFormat::Text => {
			if entries.is_empty() {
				println!("No tags found.");
				return Ok(());
			}

			for entry in &entries {
				if entry.value.is_empty() {
					println!("{}", colored!(entry.name, bold));
				} else {
					println!("{} {}", colored!(entry.name, bold), entry.value);
				}
			}
		}
	}

	Ok(())
}

fn run_remove(args: &DocblockCli, tag: &str, show_diff: bool) -> CliResult {
	let (input, mut parsed) = parse_input(args)?;
	let tag = normalize_tag_name(tag);
	let removed = parsed.tree.remove_tags_named(&tag);
	tracing::debug!(tag = %tag, removed, "removed tags");

	if removed == 0 {
		eprintln!(
			"{} no `{tag}` tag found",
			colored!("warning:", yellow)
		);
	}

	emit(&input, &parsed, show_diff)
}

fn run_set_type(
	args: &DocblockCli,
	tag: &str,
	new_type: &str,
	var: Option<&str>,
	show_diff: bool,
) -> CliResult {
	let (input, mut parsed) = parse_input(args)?;
	let tag = normalize_tag_name(tag);
	let new_type = TypeNode::parse(new_type)?;

	let Some(target) = parsed
		.tree
		.tags_mut()
		.filter(|node| node.name == tag)
		.find(|node| var.is_none_or(|var| names_variable(&node.value, var)))
	else {
		let target = match var {
			Some(var) => format!("`{tag}` tag for `${}`", var.trim_start_matches('$')),
			None => format!("`{tag}` tag"),
		};
		return Err(format!("no {target} found").into());
	};

	if !target.value.set_type(new_type) {
		return Err(format!("`{tag}` does not carry a type").into());
	}

	emit(&input, &parsed, show_diff)
}

/// Whether a value names the variable `var` (with or without `$`).
fn names_variable(value: &ValueNode, var: &str) -> bool {
	let var = var.trim_start_matches('$');

	match value {
		ValueNode::Param(param) => param.name.trim_start_matches('$') == var,
		ValueNode::Var(value) => {
			value
				.name
				.as_deref()
				.is_some_and(|name| name.trim_start_matches('$') == var)
		}
		_ => false,
	}
}

fn normalize_tag_name(tag: &str) -> String {
	if tag.starts_with('@') {
		tag.to_string()
	} else {
		format!("@{tag}")
	}
}

/// Print the edited comment, or the diff against the input.
fn emit(input: &str, parsed: &ParsedDocblock, show_diff: bool) -> CliResult {
	let printed = parsed.print()?;

	if show_diff {
		print_diff(input, &printed);
	} else {
		println!("{printed}");
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		let line = change.to_string_lossy();
		let line = line.trim_end_matches('\n');
		match change.tag() {
			ChangeTag::Delete => {
				println!("{}", colored!(format!("-{line}"), red));
			}
			ChangeTag::Insert => {
				println!("{}", colored!(format!("+{line}"), green));
			}
			ChangeTag::Equal => {
				println!(" {line}");
			}
		}
	}
}
