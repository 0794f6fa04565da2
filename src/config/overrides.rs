//! Field-level overrides read from `pacwall.conf`.
//!
//! The file is parsed into a settings tree and every known path is looked up
//! independently. A missing or wrongly typed value leaves the default alone;
//! only a syntax error or a broken repository entry is fatal.
//!
//! ## Merge Strategy
//! - Scalars: replaced one by one, escaped on the way in.
//! - Features: replaced one by one, stored as-is.
//! - Repository attributes: all or nothing. A group in the file replaces the
//!   whole default list, it is never merged with it.

use super::escape::{Fragment, escape};
use super::syntax::parse_tree;
use super::types::{Options, RepositoryEntry, default_repositories};
use crate::error::{ResolveError, ResolveResult};
use serde_yaml::Value;
use tracing::{debug, warn};

/// Path of the repository attribute group.
pub const REPOSITORY_PATH: &str = "attributes.package.repository";

/// Path of the installed-size toggle.
pub const INSTALLED_SIZE_ENABLED_PATH: &str = "features.installed-size.enabled";

/// Path of the installed-size threshold.
pub const INSTALLED_SIZE_DELTA_PATH: &str = "features.installed-size.delta";

/// A string-valued option that can be overridden from the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Hook,
    Shell,
    Db,
    Graph,
    PackageCommon,
    PackageImplicit,
    PackageExplicit,
    PackageOrphan,
    PackageUnneeded,
    PackageOutdated,
    PackageUnresolved,
    DependencyCommon,
    DependencyHard,
    DependencyOptional,
}

impl ScalarKey {
    /// Every overridable scalar, in lookup order.
    pub const ALL: [ScalarKey; 14] = [
        ScalarKey::Hook,
        ScalarKey::Shell,
        ScalarKey::Db,
        ScalarKey::Graph,
        ScalarKey::PackageCommon,
        ScalarKey::PackageImplicit,
        ScalarKey::PackageExplicit,
        ScalarKey::PackageOrphan,
        ScalarKey::PackageUnneeded,
        ScalarKey::PackageOutdated,
        ScalarKey::PackageUnresolved,
        ScalarKey::DependencyCommon,
        ScalarKey::DependencyHard,
        ScalarKey::DependencyOptional,
    ];

    /// Dotted path of this option in the configuration file.
    pub fn path(self) -> &'static str {
        match self {
            ScalarKey::Hook => "hook",
            ScalarKey::Shell => "shell",
            ScalarKey::Db => "db",
            ScalarKey::Graph => "attributes.graph",
            ScalarKey::PackageCommon => "attributes.package.common",
            ScalarKey::PackageImplicit => "attributes.package.implicit",
            ScalarKey::PackageExplicit => "attributes.package.explicit",
            ScalarKey::PackageOrphan => "attributes.package.orphan",
            ScalarKey::PackageUnneeded => "attributes.package.unneeded",
            ScalarKey::PackageOutdated => "attributes.package.outdated",
            ScalarKey::PackageUnresolved => "attributes.package.unresolved",
            ScalarKey::DependencyCommon => "attributes.dependency.common",
            ScalarKey::DependencyHard => "attributes.dependency.hard",
            ScalarKey::DependencyOptional => "attributes.dependency.optional",
        }
    }

    /// Read this option's current value.
    pub fn get(self, opts: &Options) -> Option<&Fragment> {
        let attrs = &opts.attributes;
        match self {
            ScalarKey::Hook => opts.hook.as_ref(),
            ScalarKey::Shell => Some(&opts.shell),
            ScalarKey::Db => Some(&opts.db),
            ScalarKey::Graph => Some(&attrs.graph),
            ScalarKey::PackageCommon => Some(&attrs.package.common),
            ScalarKey::PackageImplicit => Some(&attrs.package.implicit),
            ScalarKey::PackageExplicit => Some(&attrs.package.explicit),
            ScalarKey::PackageOrphan => Some(&attrs.package.orphan),
            ScalarKey::PackageUnneeded => Some(&attrs.package.unneeded),
            ScalarKey::PackageOutdated => Some(&attrs.package.outdated),
            ScalarKey::PackageUnresolved => Some(&attrs.package.unresolved),
            ScalarKey::DependencyCommon => Some(&attrs.dependency.common),
            ScalarKey::DependencyHard => Some(&attrs.dependency.hard),
            ScalarKey::DependencyOptional => Some(&attrs.dependency.optional),
        }
    }

    fn set(self, opts: &mut Options, value: Fragment) {
        let attrs = &mut opts.attributes;
        match self {
            ScalarKey::Hook => opts.hook = Some(value),
            ScalarKey::Shell => opts.shell = value,
            ScalarKey::Db => opts.db = value,
            ScalarKey::Graph => attrs.graph = value,
            ScalarKey::PackageCommon => attrs.package.common = value,
            ScalarKey::PackageImplicit => attrs.package.implicit = value,
            ScalarKey::PackageExplicit => attrs.package.explicit = value,
            ScalarKey::PackageOrphan => attrs.package.orphan = value,
            ScalarKey::PackageUnneeded => attrs.package.unneeded = value,
            ScalarKey::PackageOutdated => attrs.package.outdated = value,
            ScalarKey::PackageUnresolved => attrs.package.unresolved = value,
            ScalarKey::DependencyCommon => attrs.dependency.common = value,
            ScalarKey::DependencyHard => attrs.dependency.hard = value,
            ScalarKey::DependencyOptional => attrs.dependency.optional = value,
        }
    }
}

/// Where the repository attribute list comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RepositorySource {
    /// Keep the five built-in entries.
    #[default]
    UseDefaults,
    /// Replace the built-in entries with exactly these.
    UseFileEntries(Vec<RepositoryEntry>),
}

impl RepositorySource {
    pub fn into_entries(self) -> Vec<RepositoryEntry> {
        match self {
            RepositorySource::UseDefaults => default_repositories(),
            RepositorySource::UseFileEntries(entries) => entries,
        }
    }
}

/// Installed-size feature values present in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstalledSizeOverrides {
    pub enabled: Option<bool>,
    pub delta: Option<f64>,
}

/// Everything the configuration file overrides, ready to apply to defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOverrides {
    scalars: Vec<(ScalarKey, Fragment)>,
    pub repository: RepositorySource,
    pub installed_size: InstalledSizeOverrides,
}

impl FileOverrides {
    /// Parse configuration text and collect its overrides.
    pub fn parse(text: &str) -> ResolveResult<Self> {
        let tree = parse_tree(text)?;
        Self::from_tree(&tree)
    }

    fn from_tree(tree: &Value) -> ResolveResult<Self> {
        let scalars = ScalarKey::ALL
            .into_iter()
            .filter_map(|key| lookup_string(tree, key.path()).map(|value| (key, value)))
            .collect();

        Ok(Self {
            scalars,
            repository: repository_source(tree)?,
            installed_size: InstalledSizeOverrides {
                enabled: lookup_bool(tree, INSTALLED_SIZE_ENABLED_PATH),
                delta: lookup_float(tree, INSTALLED_SIZE_DELTA_PATH),
            },
        })
    }

    /// The escaped file value for `key`, if the file sets it.
    pub fn scalar(&self, key: ScalarKey) -> Option<&Fragment> {
        self.scalars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Whether the file changes nothing.
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
            && self.repository == RepositorySource::UseDefaults
            && self.installed_size == InstalledSizeOverrides::default()
    }
}

impl Options {
    /// Layer file overrides on top of these options.
    pub fn with_file_overrides(mut self, overrides: FileOverrides) -> Self {
        for (key, value) in overrides.scalars {
            debug!(path = key.path(), value = %value, "Override from config file");
            key.set(&mut self, value);
        }

        if let RepositorySource::UseFileEntries(ref entries) = overrides.repository {
            debug!(count = entries.len(), "Replacing repository attributes from config file");
        }
        self.attributes.package.repository = overrides.repository.into_entries();

        let installed_size = &mut self.features.installed_size;
        if let Some(enabled) = overrides.installed_size.enabled {
            debug!(path = INSTALLED_SIZE_ENABLED_PATH, enabled, "Override from config file");
            installed_size.enabled = enabled;
        }
        if let Some(delta) = overrides.installed_size.delta {
            debug!(path = INSTALLED_SIZE_DELTA_PATH, delta, "Override from config file");
            installed_size.delta = delta;
        }

        self
    }
}

/// Follow a dotted path through nested groups.
fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(tree, |node, key| node.as_mapping()?.get(key))
}

fn lookup_string(tree: &Value, path: &str) -> Option<Fragment> {
    match lookup(tree, path)? {
        Value::String(raw) => Some(escape(raw)),
        other => {
            warn!(path, found = value_kind(other), "Expected a string, keeping default");
            None
        }
    }
}

fn lookup_bool(tree: &Value, path: &str) -> Option<bool> {
    match lookup(tree, path)? {
        Value::Bool(value) => Some(*value),
        other => {
            warn!(path, found = value_kind(other), "Expected a boolean, keeping default");
            None
        }
    }
}

fn lookup_float(tree: &Value, path: &str) -> Option<f64> {
    match lookup(tree, path)? {
        Value::Number(number) => number.as_f64(),
        other => {
            warn!(path, found = value_kind(other), "Expected a number, keeping default");
            None
        }
    }
}

fn repository_source(tree: &Value) -> ResolveResult<RepositorySource> {
    let group = match lookup(tree, REPOSITORY_PATH) {
        None => return Ok(RepositorySource::UseDefaults),
        Some(Value::Mapping(group)) => group,
        Some(other) => {
            warn!(
                path = REPOSITORY_PATH,
                found = value_kind(other),
                "Expected a group, keeping default repositories"
            );
            return Ok(RepositorySource::UseDefaults);
        }
    };

    let mut entries = Vec::with_capacity(group.len());
    for (key, value) in group {
        // Setting names are always strings in parsed files.
        let Some(name) = key.as_str() else {
            warn!(path = REPOSITORY_PATH, found = value_kind(key), "Skipping unnamed repository entry");
            continue;
        };

        let attributes = match value {
            Value::String(raw) => escape(raw),
            other => {
                return Err(ResolveError::InvalidRepositoryEntry {
                    name: name.to_string(),
                    found: value_kind(other),
                });
            }
        };
        entries.push(RepositoryEntry::new(name, attributes));
    }

    Ok(RepositorySource::UseFileEntries(entries))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a group",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Attributes, DEFAULT_INSTALLED_SIZE_DELTA};

    fn resolve(text: &str) -> Options {
        let overrides = FileOverrides::parse(text).unwrap();
        Options::default().with_file_overrides(overrides)
    }

    #[test]
    fn test_empty_file_keeps_every_default() {
        let overrides = FileOverrides::parse("").unwrap();
        assert!(overrides.is_empty());
        assert_eq!(resolve("\n  \n# only a comment\n"), Options::default());
    }

    #[test]
    fn test_unrelated_keys_keep_every_default() {
        let opts = resolve("something_else = 1;\nattributes: { unknown = \"x\"; };\n");
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_each_scalar_path_overrides_only_itself() {
        let defaults = Options::default();
        for key in ScalarKey::ALL {
            // Build the nested groups for this dotted path.
            let parts: Vec<&str> = key.path().split('.').collect();
            let (leaf, groups) = parts.split_last().unwrap();
            let mut text = String::new();
            for group in groups {
                text.push_str(&format!("{group}: {{ "));
            }
            text.push_str(&format!("{leaf} = \"value=\\\"x\\\"\"; "));
            text.push_str(&"}; ".repeat(groups.len()));

            let opts = resolve(&text);
            assert_eq!(
                key.get(&opts).map(Fragment::as_str),
                Some("value='x'"),
                "path {}",
                key.path()
            );
            for other in ScalarKey::ALL.into_iter().filter(|k| *k != key) {
                assert_eq!(other.get(&opts), other.get(&defaults), "path {}", other.path());
            }
        }
    }

    #[test]
    fn test_scalar_values_are_escaped() {
        let opts = resolve(
            r##"
attributes: {
    graph = "bgcolor=\"#fff\"";
    package: {
        explicit = "label='pkg'";
    };
};
"##,
        );
        assert_eq!(opts.attributes.graph, "bgcolor='#fff'");
        assert_eq!(opts.attributes.package.explicit, r#"label="pkg""#);
    }

    #[test]
    fn test_hook_set_from_file() {
        let opts = resolve("hook = \"notify-send \\\"done\\\"\";\n");
        assert_eq!(
            opts.hook.as_ref().map(Fragment::as_str),
            Some("notify-send 'done'")
        );
    }

    #[test]
    fn test_wrong_typed_scalar_keeps_default() {
        let opts = resolve("shell = 42;\ndb = [\"a\", \"b\"];\nhook = true;\n");
        assert_eq!(opts.shell, "bash");
        assert_eq!(opts.db, "/var/lib/pacman");
        assert!(opts.hook.is_none());
    }

    #[test]
    fn test_scalar_under_non_group_parent_is_absent() {
        let opts = resolve("attributes = \"not a group\";\n");
        assert_eq!(opts.attributes, Attributes::default());
    }

    #[test]
    fn test_single_repository_replaces_defaults() {
        let opts = resolve(
            r##"
attributes: {
    package: {
        repository: {
            testrepo = "color=\"#123456\"";
        };
    };
};
"##,
        );
        let repos = &opts.attributes.package.repository;
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "testrepo");
        assert_eq!(repos[0].attributes, "color='#123456'");
    }

    #[test]
    fn test_repository_order_follows_file() {
        let opts = resolve(
            r#"
attributes: { package: { repository: {
    zeta = "";
    alpha = "color=red";
    * = "color=blue";
}; }; };
"#,
        );
        let names: Vec<&str> = opts
            .attributes
            .package
            .repository
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, ["zeta", "alpha", "*"]);
        assert!(opts.attributes.package.repository[2].is_wildcard());
        assert!(opts.attributes.package.repository[0].attributes.is_empty());
    }

    #[test]
    fn test_absent_repository_keeps_defaults() {
        let opts = resolve("shell = \"zsh\";\n");
        assert_eq!(opts.attributes.package.repository, default_repositories());
    }

    #[test]
    fn test_non_group_repository_keeps_defaults() {
        let opts = resolve("attributes: { package: { repository = [\"core\", \"extra\"]; }; };\n");
        assert_eq!(opts.attributes.package.repository, default_repositories());

        let opts = resolve("attributes: { package: { repository = \"core\"; }; };\n");
        assert_eq!(opts.attributes.package.repository, default_repositories());
    }

    #[test]
    fn test_empty_repository_group_yields_no_entries() {
        let opts = resolve("attributes: { package: { repository: { }; }; };\n");
        assert!(opts.attributes.package.repository.is_empty());
    }

    #[test]
    fn test_non_string_repository_entry_is_fatal() {
        let err = FileOverrides::parse("attributes: { package: { repository: { core = 3; }; }; };\n")
            .unwrap_err();
        match err {
            ResolveError::InvalidRepositoryEntry { name, found } => {
                assert_eq!(name, "core");
                assert_eq!(found, "a number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_installed_size_enabled_without_delta() {
        let opts = resolve("features: { installed-size: { enabled = false; }; };\n");
        assert!(!opts.features.installed_size.enabled);
        assert_eq!(opts.features.installed_size.delta, DEFAULT_INSTALLED_SIZE_DELTA);
    }

    #[test]
    fn test_installed_size_delta_accepts_integers() {
        let opts = resolve("features: { installed-size: { delta = 1; }; };\n");
        assert!(opts.features.installed_size.enabled);
        assert_eq!(opts.features.installed_size.delta, 1.0);

        let opts = resolve("features: { installed-size: { delta = 0.5; }; };\n");
        assert_eq!(opts.features.installed_size.delta, 0.5);
    }

    #[test]
    fn test_wrong_typed_features_keep_defaults() {
        let opts =
            resolve("features: { installed-size: { enabled = \"no\"; delta = \"big\"; }; };\n");
        assert!(opts.features.installed_size.enabled);
        assert_eq!(opts.features.installed_size.delta, DEFAULT_INSTALLED_SIZE_DELTA);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = FileOverrides::parse("shell = \"bash\";\ndb = [\"unclosed\"\n").unwrap_err();
        match err {
            ResolveError::ConfigMalformed { line, message } => {
                assert_eq!(line, 3);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_file_is_malformed() {
        let err = FileOverrides::parse("shell: zsh\nattributes:\n  graph: x\n").unwrap_err();
        assert!(matches!(err, ResolveError::ConfigMalformed { line: 1, .. }));
    }

    #[test]
    fn test_multi_document_file_reports_line() {
        let err = FileOverrides::parse("shell = \"zsh\";\n---\nshell = \"bash\";\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed pacwall.conf (line 2): unexpected '-', expected a setting name"
        );
    }

    #[test]
    fn test_duplicate_keys_are_malformed() {
        let err = FileOverrides::parse("shell = \"bash\";\nshell = \"zsh\";\n").unwrap_err();
        assert!(matches!(err, ResolveError::ConfigMalformed { line: 2, .. }));
    }

    #[test]
    fn test_libconfig_style_file() {
        let opts = resolve(
            r##"
shell = "zsh";
attributes: {
    graph = "bgcolor=\"#fff\"";
};
"##,
        );
        assert_eq!(opts.shell, "zsh");
        assert_eq!(opts.attributes.graph, "bgcolor='#fff'");
    }

    #[test]
    fn test_overrides_report_scalar_values() {
        let overrides = FileOverrides::parse("shell = \"zsh\";\n").unwrap();
        assert_eq!(
            overrides.scalar(ScalarKey::Shell).map(Fragment::as_str),
            Some("zsh")
        );
        assert!(overrides.scalar(ScalarKey::Db).is_none());
        assert!(!overrides.is_empty());
    }
}
