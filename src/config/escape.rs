//! Quote swapping for strings lifted out of `pacwall.conf`.
//!
//! Every string read from the configuration file ends up inside a quoted
//! literal of the generated graph description. Double quotes become single
//! quotes and single quotes become double quotes, so a user-supplied fragment
//! like `color="#fff"` can never terminate the enclosing literal early.
//!
//! The swap is its own inverse, which makes applying it twice a bug. The
//! [`Fragment`] type guards against that. Outside this crate a `Fragment` is
//! either a compiled-in literal or the output of option resolution, and it
//! does not dereference to `str`, so it never slides back into [`escape`]
//! through a coercion.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A string that is safe to embed in a quoted graph-description literal.
///
/// Either a compiled-in default (already safe) or user text that went
/// through `escape` exactly once. Borrow the text with [`Fragment::as_str`];
/// there is no implicit conversion to `&str`.
///
/// ```compile_fail
/// use pacwall_opts::config::Fragment;
///
/// let fragment = Fragment::builtin("color=red");
/// let text: &str = &fragment;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fragment(Cow<'static, str>);

impl Fragment {
    /// Wrap a compiled-in literal. No transform is applied.
    pub const fn builtin(text: &'static str) -> Self {
        Self(Cow::Borrowed(text))
    }

    /// An empty fragment.
    pub const fn empty() -> Self {
        Self::builtin("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Fragment {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Fragment {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Swap `"` and `'` in user-supplied text.
///
/// Both characters are single bytes, so the output has the same length as
/// the input and every other character is untouched.
pub(crate) fn escape(raw: &str) -> Fragment {
    let swapped: String = raw
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\'' => '"',
            other => other,
        })
        .collect();
    Fragment(Cow::Owned(swapped))
}
