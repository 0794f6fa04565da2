//! Layered option resolution.
//!
//! Produces one fully populated [`Options`] value from three ordered sources,
//! each overriding the previous one field by field:
//! 1. **Defaults** - compiled in, see [`Options::default()`]
//! 2. **File** - `$XDG_CONFIG_HOME/pacwall/pacwall.conf` (or `~/.config/pacwall/`)
//! 3. **Command line** - `-u`, `-g`, `-k` skip switches
//!
//! ## Merge Strategy
//! - Strings from the file are escaped once, on the way in (see [`Fragment`]).
//! - The repository attribute group replaces the default list wholesale.
//! - Skip switches exist only on the command line; the file cannot set them.

mod escape;
mod loader;
mod overrides;
mod syntax;
mod types;

pub use escape::Fragment;
pub use loader::{
    APP_DIR_NAME, CONFIG_FILE_NAME, CONFIG_HOME_FALLBACK, CONFIG_HOME_VAR, ConfigLoader,
    ConfigPaths,
};
pub use overrides::{
    FileOverrides, INSTALLED_SIZE_DELTA_PATH, INSTALLED_SIZE_ENABLED_PATH,
    InstalledSizeOverrides, REPOSITORY_PATH, RepositorySource, ScalarKey,
};
pub use syntax::parse_tree;
pub use types::*;
