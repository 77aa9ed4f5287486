use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn docblock_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("docblock"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("DOCBLOCK_LOG");
	cmd
}

/// Write `content` to `comment.txt` in `dir` and return a command that reads
/// it, with `dir` as the config root.
pub fn docblock_cmd_for(dir: &Path, content: &str) -> std::io::Result<Command> {
	let file = dir.join("comment.txt");
	std::fs::write(&file, content)?;

	let mut cmd = docblock_cmd();
	cmd.arg("--file").arg(file).arg("--path").arg(dir);
	Ok(cmd)
}
