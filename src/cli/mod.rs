//! Command-line flags for pacwall.
//!
//! The command line carries no configuration, only three switches that skip a
//! phase of the run. Every character of every argument is a flag on its own:
//! `-ug`, `-u -g` and `ug` all mean the same thing, `-` is only a separator,
//! and repeating a flag changes nothing.

use crate::config::SkipFlags;
use crate::error::{ResolveError, ResolveResult};
use tracing::debug;

/// Program name shown in the usage message when `argv[0]` is missing.
pub const DEFAULT_PROGRAM_NAME: &str = "pacwall";

impl SkipFlags {
    /// Parse skip flags from the full argument list, program name first.
    pub fn from_args<I, S>(args: I) -> ResolveResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        let program = args
            .next()
            .map(|name| name.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());

        let mut flags = SkipFlags::default();
        for arg in args {
            for flag in arg.as_ref().chars() {
                match flag {
                    '-' => {}
                    'u' => flags.fetch = true,
                    'g' => flags.generate = true,
                    'k' => flags.hook = true,
                    _ => {
                        return Err(ResolveError::CliUsage { program });
                    }
                }
            }
        }

        debug!(
            skip_fetch = flags.fetch,
            skip_generate = flags.generate,
            skip_hook = flags.hook,
            "Parsed command-line flags"
        );
        Ok(flags)
    }
}
