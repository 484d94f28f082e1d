//! Configuration file handling for driftcheck.
//!
//! Looks for `.config/driftcheck.styx` in the current directory or any parent
//! directory. A missing file is not an error: every setting has a default or
//! can be passed on the command line.

pub use driftcheck_config::Config;

use std::path::{Path, PathBuf};

/// A loaded configuration and the project root it was found in.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub config: Config,
    /// Directory containing `.config/`, used to resolve relative paths.
    pub root: Option<PathBuf>,
}

impl Loaded {
    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Load configuration, searching up the directory tree from the current directory.
pub fn load() -> Result<Loaded, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
    load_from(&cwd)
}

/// Load configuration starting from a specific directory.
pub fn load_from(start: &Path) -> Result<Loaded, ConfigError> {
    let Some(config_path) = find_config_file(start) else {
        tracing::debug!(start = %start.display(), "no .config/driftcheck.styx found, using defaults");
        return Ok(Loaded::default());
    };

    let content =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io(e.to_string()))?;

    let config: Config =
        facet_styx::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    tracing::debug!(path = %config_path.display(), "loaded configuration");

    // .config/driftcheck.styx -> project root
    let root = config_path
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    Ok(Loaded { config, root })
}

/// Find `.config/driftcheck.styx` by searching up the directory tree.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".config/driftcheck.styx");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the file
    Io(String),
    /// Parse error in the Styx file
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read .config/driftcheck.styx: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse .config/driftcheck.styx: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
