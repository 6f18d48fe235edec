use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostics::Error;
use crate::interpreter::DEFAULT_MAX_CALL_DEPTH;

pub const CONFIG_FILE: &str = "jolang.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub repl: ReplConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self { max_call_depth: DEFAULT_MAX_CALL_DEPTH }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    pub prompt: String,
    pub history: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self { prompt: "JoLang >>> ".to_string(), history: true }
    }
}

impl Config {
    /// Parse `jolang.toml` content; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, Error> {
        let config: Config = toml::from_str(content).map_err(|e| {
            Error::config(format!("{CONFIG_FILE}: invalid syntax: {e}"), path.to_path_buf())
        })?;
        if config.interpreter.max_call_depth == 0 {
            return Err(Error::config(
                format!("{CONFIG_FILE}: 'max_call_depth' must be at least 1"),
                path.to_path_buf(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("{CONFIG_FILE}: could not read file: {e}"), path.to_path_buf())
        })?;
        Self::parse(&content, path)
    }

    /// Use `explicit` when given, else the nearest `jolang.toml` above
    /// `start_dir`, else defaults.
    pub fn discover(explicit: Option<&Path>, start_dir: &Path) -> Result<Self, Error> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match find_config_walk(start_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Walk from start_dir up to .git or the filesystem root, looking for jolang.toml.
pub fn find_config_walk(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        // .git may be a file in worktrees
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}
