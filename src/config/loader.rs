//! Configuration loader.
//!
//! Finds the per-user configuration directory, reads `pacwall.conf` from it
//! and layers it over the defaults.

use super::overrides::FileOverrides;
use super::types::{Options, SkipFlags};
use crate::error::{ResolveError, ResolveResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "pacwall.conf";

/// Application subdirectory under the user's configuration root.
pub const APP_DIR_NAME: &str = "pacwall";

/// Environment variable naming the user's configuration root.
pub const CONFIG_HOME_VAR: &str = "XDG_CONFIG_HOME";

/// Fallback configuration root, relative to the home directory.
pub const CONFIG_HOME_FALLBACK: &str = ".config";

/// Location of the configuration directory and file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Directory the tool works in; `pacwall.conf` lives here.
    pub config_dir: PathBuf,
}

impl ConfigPaths {
    /// Discover the configuration directory from the environment.
    pub fn discover() -> ResolveResult<Self> {
        let config_home = std::env::var_os(CONFIG_HOME_VAR).map(PathBuf::from);
        Self::from_roots(config_home, dirs::home_dir())
    }

    /// Pick the configuration directory from an explicit config root and home.
    ///
    /// An empty config root counts as unset. Relative roots are anchored to
    /// the current working directory, so the result stays valid after the
    /// process moves into it.
    pub fn from_roots(config_home: Option<PathBuf>, home: Option<PathBuf>) -> ResolveResult<Self> {
        let root = config_home
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| home.map(|h| h.join(CONFIG_HOME_FALLBACK)))
            .ok_or(ResolveError::NoConfigDir)?;

        let dir = root.join(APP_DIR_NAME);
        let config_dir = std::path::absolute(&dir)
            .map_err(|source| ResolveError::ConfigDirUnresolved { path: dir, source })?;
        Ok(Self::with_dir(config_dir))
    }

    /// Use an explicit configuration directory.
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Full path of `pacwall.conf`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// Reads the configuration file and resolves options from it.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    /// Read and parse `pacwall.conf` into a set of overrides.
    ///
    /// A missing or unreadable file is fatal; there is no defaults-only
    /// fallback.
    pub fn load_overrides(&self) -> ResolveResult<FileOverrides> {
        let path = self.paths.config_file();
        let text = read_config_text(&path)?;
        let overrides = FileOverrides::parse(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(overrides)
    }

    /// Defaults with the configuration file layered on top.
    pub fn load(&self) -> ResolveResult<Options> {
        Ok(Options::default().with_file_overrides(self.load_overrides()?))
    }

    /// Full resolution: defaults, then the file, then command-line flags.
    ///
    /// File errors are reported before flag errors.
    pub fn resolve<I, S>(&self, args: I) -> ResolveResult<Options>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let opts = self.load()?;
        let skip = SkipFlags::from_args(args)?;
        Ok(opts.with_skip_flags(skip))
    }
}

/// Read the whole file. The handle is closed before parsing starts.
fn read_config_text(path: &Path) -> ResolveResult<String> {
    let bytes = std::fs::read(path).map_err(|source| ResolveError::ConfigMissing {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
        ResolveError::ConfigMalformed {
            line,
            message: "file is not valid UTF-8".to_string(),
        }
    })
}
