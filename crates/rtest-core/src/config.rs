//! Configuration loading
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults (`go test`, `.go` files)
//! 2. Project config: `<root>/rtest.toml`
//! 3. Environment variables: `RTEST_*`
//! 4. CLI flags
//!
//! The result is immutable; components receive it by reference or clone the
//! parts they need.
//!
//! # Example Config
//!
//! ```toml
//! [command]
//! program = "go"
//! args = ["test", "-count=1"]
//! source_extension = "go"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Name of the optional project config file inside the watch root
pub const CONFIG_FILE_NAME: &str = "rtest.toml";

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory tree to watch; manual triggers test this directory
    pub root: PathBuf,
    /// Emit debug tracing
    pub debug: bool,
    /// Read manual triggers from stdin
    pub manual_trigger: bool,
    /// Passed verbatim to every test run, after the command's own args
    pub extra_args: Vec<String>,
    pub command: CommandConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Extension of files whose edits trigger a run, without the dot
    pub source_extension: String,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub debug: bool,
    pub no_input: bool,
    pub extra_args: Vec<String>,
}

/// Contents of `rtest.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    command: PartialCommandConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PartialCommandConfig {
    program: Option<String>,
    args: Option<Vec<String>>,
    source_extension: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: vec!["test".to_string()],
            source_extension: "go".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns error if:
/// - The current directory cannot be determined (no `--rtest-root` given)
/// - `rtest.toml` exists but cannot be read or is malformed
/// - An `RTEST_*` variable holds an invalid value
/// - The resulting command config fails validation
pub async fn load_config(cli: CliOverrides) -> Result<Config> {
    let root = resolve_root(cli.root.as_deref())?;

    // 1. Built-in defaults
    let mut command = CommandConfig::default();

    // 2. Project config
    let config_path = root.join(CONFIG_FILE_NAME);
    if tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
        let file = load_toml_file(&config_path).await?;
        command.merge(file.command);
    }

    // 3. Environment
    command.apply_env_vars();

    // 4. CLI is applied by building the final value
    let config = Config {
        root,
        debug: cli.debug,
        manual_trigger: !cli.no_input,
        extra_args: cli.extra_args,
        command,
    };
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Check the values that would make every run fail
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty program or extension.
    pub fn validate(&self) -> Result<()> {
        if self.command.program.trim().is_empty() {
            return Err(Error::invalid_config("command.program cannot be empty"));
        }
        if self.command.source_extension.is_empty() {
            return Err(Error::invalid_config(
                "command.source_extension cannot be empty",
            ));
        }
        if self.command.source_extension.contains(['/', '\\']) {
            return Err(Error::invalid_config(format!(
                "command.source_extension must be a bare extension, got {:?}",
                self.command.source_extension
            )));
        }
        Ok(())
    }
}

impl CommandConfig {
    fn merge(&mut self, other: PartialCommandConfig) {
        if let Some(program) = other.program {
            self.program = program;
        }
        if let Some(args) = other.args {
            self.args = args;
        }
        if let Some(ext) = other.source_extension {
            self.source_extension = normalize_extension(&ext);
        }
    }

    fn apply_env_vars(&mut self) {
        // RTEST_PROGRAM
        if let Ok(value) = std::env::var("RTEST_PROGRAM") {
            self.program = value;
        }

        // RTEST_SOURCE_EXT
        if let Ok(value) = std::env::var("RTEST_SOURCE_EXT") {
            self.source_extension = normalize_extension(&value);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Absolute watch root: the given path, or the current directory
fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| Error::io_error(format!("Failed to get working dir: {e}")))?,
    };
    std::path::absolute(&root).map_err(|e| {
        Error::io_error(format!(
            "Failed to resolve watch root {}: {e}",
            root.display()
        ))
    })
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Read and parse `rtest.toml`
async fn load_toml_file(path: &Path) -> Result<FileConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::io_error(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    Ok(toml::from_str(&content)?)
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
