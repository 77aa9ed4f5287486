use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocblockError;
use crate::DocblockParser;
use crate::DocblockResult;
use crate::HostScope;
use crate::ImportResolver;
use crate::RawTagMatcher;
use crate::SilentKeyMap;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"docblock.toml",
	".docblock.toml",
	".config/docblock.toml",
];

/// Configuration loaded from a `docblock.toml` file.
///
/// ```toml
/// # Tags kept as raw text, never resolved.
/// raw_tags = ["@example"]
///
/// [annotations]
/// Route = "Symfony\\Component\\Routing\\Annotation\\Route"
///
/// [silent_keys]
/// "Symfony\\Component\\Routing\\Annotation\\Route" = "path"
///
/// [host]
/// namespace = "App\\Controller"
/// uses = { ORM = "Doctrine\\ORM\\Mapping" }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DocblockConfig {
	/// Tag name (without `@`) to the fully qualified annotation name.
	#[serde(default)]
	pub annotations: BTreeMap<String, String>,
	/// Fully qualified annotation name to the key of its positional argument.
	#[serde(default)]
	pub silent_keys: SilentKeyMap,
	/// The scope comments are resolved in.
	#[serde(default)]
	pub host: HostScope,
	/// Resolve capitalized unqualified tags against `host.namespace`.
	#[serde(default)]
	pub resolve_in_namespace: bool,
	/// Tags whose payload is always kept verbatim.
	#[serde(default)]
	pub raw_tags: Vec<String>,
}

impl DocblockConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DocblockResult<Option<DocblockConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Self::from_toml(&content).map(Some)
	}

	pub fn from_toml(content: &str) -> DocblockResult<DocblockConfig> {
		toml::from_str(content).map_err(|e| DocblockError::ConfigParse(e.to_string()))
	}

	/// Build a parser wired with this configuration.
	pub fn parser(&self) -> DocblockParser {
		let resolver = ImportResolver::new()
			.with_aliases(self.annotations.clone())
			.resolve_in_namespace(self.resolve_in_namespace);

		let mut parser = DocblockParser::new()
			.with_resolver(resolver)
			.with_silent_keys(self.silent_keys.clone())
			.with_host(self.host.clone());

		if !self.raw_tags.is_empty() {
			parser = parser.with_matcher(RawTagMatcher::new(self.raw_tags.iter().cloned()));
		}

		parser
	}
}
