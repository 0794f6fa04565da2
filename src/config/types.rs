//! Resolved options and the compiled-in default profile.
//!
//! [`Options::default()`] is the baseline every resolution starts from. The
//! file stage and the CLI stage each consume an `Options` and return a new
//! one; nothing mutates a resolved value after it is handed to the caller.

use super::escape::Fragment;
use serde::Serialize;

/// Default interpreter used to run the hook.
pub const DEFAULT_SHELL: &str = "bash";

/// Default location of the package database.
pub const DEFAULT_DB: &str = "/var/lib/pacman";

/// Default significance threshold for the installed-size feature.
pub const DEFAULT_INSTALLED_SIZE_DELTA: f64 = 2e-5;

/// Repository name that matches every repository without its own entry.
pub const WILDCARD_REPOSITORY: &str = "*";

/// The fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    /// Command run after the wallpaper is generated. Absent by default.
    pub hook: Option<Fragment>,

    /// Interpreter used to run the hook.
    pub shell: Fragment,

    /// Path to the package database.
    pub db: Fragment,

    /// Graph-description attribute fragments.
    pub attributes: Attributes,

    /// Toggleable features.
    pub features: Features,

    /// Process-control switches. Only ever set from the command line.
    #[serde(skip)]
    pub skip: SkipFlags,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hook: None,
            shell: Fragment::builtin(DEFAULT_SHELL),
            db: Fragment::builtin(DEFAULT_DB),
            attributes: Attributes::default(),
            features: Features::default(),
            skip: SkipFlags::default(),
        }
    }
}

/// Attribute fragments, grouped the way the graph is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    /// Graph-level attributes.
    pub graph: Fragment,
    pub package: PackageAttributes,
    pub dependency: DependencyAttributes,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            graph: Fragment::builtin(r##"bgcolor="#00000000""##),
            package: PackageAttributes::default(),
            dependency: DependencyAttributes::default(),
        }
    }
}

/// Node attributes per package category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageAttributes {
    /// Applied to every package node.
    pub common: Fragment,
    /// Installed as a dependency.
    pub implicit: Fragment,
    /// Explicitly installed.
    pub explicit: Fragment,
    /// Installed as a dependency but no longer required.
    pub orphan: Fragment,
    /// Only optionally required by other packages.
    pub unneeded: Fragment,
    /// An update is available.
    pub outdated: Fragment,
    /// Not found in any sync database.
    pub unresolved: Fragment,
    /// Per-repository attributes, in declaration order.
    pub repository: Vec<RepositoryEntry>,
}

impl Default for PackageAttributes {
    fn default() -> Self {
        Self {
            common: Fragment::builtin("shape=point, height=0.1,fontname=monospace, fontsize=10"),
            implicit: Fragment::builtin(r##"color="#dc322faa""##),
            explicit: Fragment::builtin(r##"color="#268bd2aa""##),
            orphan: Fragment::builtin(
                r##"color="#2aa198aa", peripheries=2,fontcolor="#2aa198",xlabel="\N""##,
            ),
            unneeded: Fragment::empty(),
            outdated: Fragment::builtin(
                r##"color="#b58900aa", peripheries=3,fontcolor="#b58900",xlabel="\N""##,
            ),
            unresolved: Fragment::builtin(
                r##"color="#d33682aa", peripheries=4,fontcolor="#d33682",xlabel="\N""##,
            ),
            repository: default_repositories(),
        }
    }
}

/// Edge attributes per dependency category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyAttributes {
    /// Applied to every dependency edge.
    pub common: Fragment,
    pub hard: Fragment,
    pub optional: Fragment,
}

impl Default for DependencyAttributes {
    fn default() -> Self {
        Self {
            common: Fragment::builtin(r##"color="#fdf6e311""##),
            hard: Fragment::empty(),
            optional: Fragment::builtin("arrowhead=empty, style=dashed"),
        }
    }
}

/// Attributes applied to packages coming from one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryEntry {
    /// Repository name, or [`WILDCARD_REPOSITORY`].
    pub name: String,
    pub attributes: Fragment,
}

impl RepositoryEntry {
    pub fn new(name: impl Into<String>, attributes: Fragment) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Whether this entry is the catch-all entry.
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD_REPOSITORY
    }
}

/// The five built-in repository entries.
///
/// Returns a fresh list on every call so no two resolutions share one.
pub fn default_repositories() -> Vec<RepositoryEntry> {
    vec![
        RepositoryEntry::new("core", Fragment::empty()),
        RepositoryEntry::new("extra", Fragment::empty()),
        RepositoryEntry::new("community", Fragment::empty()),
        RepositoryEntry::new("multilib", Fragment::empty()),
        RepositoryEntry::new(
            WILDCARD_REPOSITORY,
            Fragment::builtin(r##"color="#859900aa""##),
        ),
    ]
}

/// Toggleable features.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Features {
    #[serde(rename = "installed-size")]
    pub installed_size: InstalledSize,
}

/// Scale package nodes by their installed size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledSize {
    pub enabled: bool,
    /// Size differences below this fraction are not drawn.
    pub delta: f64,
}

impl Default for InstalledSize {
    fn default() -> Self {
        Self {
            enabled: true,
            delta: DEFAULT_INSTALLED_SIZE_DELTA,
        }
    }
}

/// Phases of the surrounding tool that can be skipped from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipFlags {
    /// `-u`: do not fetch package updates.
    pub fetch: bool,
    /// `-g`: do not generate the graph.
    pub generate: bool,
    /// `-k`: do not run the hook.
    pub hook: bool,
}

impl Options {
    /// Replace the skip flags. File overrides never touch them.
    pub fn with_skip_flags(self, skip: SkipFlags) -> Self {
        Self { skip, ..self }
    }
}
