use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostic::Diagnostic;
use crate::emit::EmitOptions;
use crate::registry::Device;
use crate::span::Span;

pub const CONFIG_FILE: &str = "copygen.toml";

/// Generator configuration from copygen.toml.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Type registry file. `None` selects the built-in registry.
    pub registry: Option<PathBuf>,
    pub out_dir: PathBuf,
    /// Backends to emit, in output order.
    pub backends: Vec<Device>,
    pub cuda_state: String,
    pub file_prefix: String,
    /// Directory relative paths were resolved against.
    pub root_dir: PathBuf,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    generator: RawGenerator,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawGenerator {
    registry: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    backends: Option<Vec<Device>>,
    cuda_state: Option<String>,
    file_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let emit = EmitOptions::default();
        Config {
            registry: None,
            out_dir: PathBuf::from("generated"),
            backends: Device::ALL.to_vec(),
            cuda_state: emit.cuda_state,
            file_prefix: emit.file_prefix,
            root_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from a copygen.toml file.
    pub fn load(toml_path: &Path) -> Result<Config, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        let root_dir = toml_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::parse(&content, &root_dir)
    }

    /// Parse copygen.toml text; relative paths resolve against `root_dir`.
    pub fn parse(content: &str, root_dir: &Path) -> Result<Config, Diagnostic> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| {
            let span = e.span().map(Span::from).unwrap_or_else(Span::dummy);
            Diagnostic::error(format!("invalid {}: {}", CONFIG_FILE, e.message()), span)
        })?;
        let defaults = Config::default();
        let g = raw.generator;

        let mut backends = g.backends.unwrap_or(defaults.backends);
        let mut seen = HashSet::new();
        backends.retain(|d| seen.insert(*d));
        if backends.is_empty() {
            return Err(Diagnostic::error(
                "'backends' in copygen.toml must name at least one backend".to_string(),
                Span::dummy(),
            )
            .with_help("use [\"CPU\"], [\"CUDA\"] or [\"CPU\", \"CUDA\"]".to_string()));
        }

        Ok(Config {
            registry: g.registry.map(|p| root_dir.join(p)),
            out_dir: root_dir.join(g.out_dir.unwrap_or(defaults.out_dir)),
            backends,
            cuda_state: g.cuda_state.unwrap_or(defaults.cuda_state),
            file_prefix: g.file_prefix.unwrap_or(defaults.file_prefix),
            root_dir: root_dir.to_path_buf(),
        })
    }

    /// Try to find a copygen.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Load the nearest copygen.toml above `start_dir`, or defaults.
    pub fn discover(start_dir: &Path) -> Result<Config, Diagnostic> {
        match Self::find(start_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using config");
                Self::load(&path)
            }
            None => Ok(Config {
                out_dir: start_dir.join("generated"),
                root_dir: start_dir.to_path_buf(),
                ..Config::default()
            }),
        }
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            cuda_state: self.cuda_state.clone(),
            file_prefix: self.file_prefix.clone(),
        }
    }
}
