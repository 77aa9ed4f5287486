use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Inspect and edit docblocks without disturbing the formatting you did not touch.",
	long_about = "docblock parses a `/** ... */` comment, applies an edit and prints it back. \
	              Every line the edit did not touch is reproduced byte for byte.\n\nThe comment \
	              is read from `--file` or from stdin.\n\nQuick start:\n  docblock check      \
	              Verify the comment survives a parse and print unchanged\n  docblock tags       \
	              List the tags in the comment\n  docblock remove     Remove every tag with a \
	              given name\n  docblock set-type   Replace the type of a @param, @var or \
	              @return tag"
)]
pub struct DocblockCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// File holding the docblock. Reads stdin when omitted.
	#[arg(long, short, global = true)]
	pub file: Option<PathBuf>,

	/// Directory searched for `docblock.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Check that the docblock prints back exactly as it was read.
	///
	/// Exits with a non-zero status code when the printed comment differs
	/// from the input. Useful to confirm a comment is handled losslessly
	/// before editing it.
	Check {
		/// Show a diff between the input and the printed comment.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// List the tags of the docblock with their values.
	Tags {
		/// Output format for the tag listing.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Remove every tag with the given name and print the result.
	Remove {
		/// The tag to remove, e.g. `@deprecated`.
		tag: String,

		/// Show a diff instead of the edited comment.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Replace the type of a `@param`, `@var` or `@return` tag.
	///
	/// `--var` selects the `@param` (or named `@var`) for that variable.
	/// Without it the first tag with the given name is edited.
	SetType {
		/// The tag to edit, e.g. `@return`.
		tag: String,

		/// The new type, e.g. `list<int>|null`.
		#[arg(long = "type")]
		r#type: String,

		/// The variable whose tag should be edited, with or without `$`.
		#[arg(long)]
		var: Option<String>,

		/// Show a diff instead of the edited comment.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each entry includes the tag
	/// name, its value kind, its type, its rendered value and its token
	/// range.
	Json,
}
