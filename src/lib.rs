//! pacwall option resolution.
//!
//! Builds the single options value the wallpaper generator runs from, by
//! layering compiled-in defaults, the user's `pacwall.conf` and command-line
//! skip flags.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigLoader, ConfigPaths, Options, SkipFlags};
pub use error::{ResolveError, ResolveResult};
