//! C1 — Config Store.
//!
//! A compile-time static table keyed by [`ToolName`], replacing the dynamic
//! lookups a package-manager shim would otherwise need to make just to know
//! its own defaults. Content here is static at process start; a sibling
//! configuration file may replace it wholesale between releases, but within
//! a single run it never changes.

use pmshim_types::{CommandFamily, HashAlgo, IntegritySuffix, ToolName, VersionExpression};

/// Static per-tool configuration: defaults, registry identity, entrypoints.
#[derive(Debug, Clone, Copy)]
pub struct ToolConfig {
    pub name_key: &'static str,
    /// Exact default version, without the integrity suffix.
    pub default_version: &'static str,
    /// `(algo, hex digest)` pinned for the default version.
    pub default_integrity: (HashAlgo, &'static str),
    /// The registry package name to query for metadata.
    pub registry_package: &'static str,
    /// A URL template with `{name}` and `{version}` placeholders, used when
    /// the registry document doesn't supply a tarball URL directly.
    pub tarball_template: &'static str,
    /// Ordered `(commandName, relativeScriptPath)` pairs. The first entry is
    /// canonical for name-mismatch checks.
    pub bin_entries: &'static [(&'static str, &'static str)],
    /// Subcommands that may run even when the project declares a different
    /// tool (e.g. a tool-agnostic bootstrap command).
    pub transparent_commands: &'static [&'static str],
    /// The default version used for transparent-command invocations outside
    /// of any project context.
    pub transparent_default: &'static str,
}

impl ToolConfig {
    /// The canonical command name for this tool (the first `binEntries`
    /// entry), used in "this project is configured to use X" messages.
    pub fn canonical_command(&self) -> &'static str {
        self.bin_entries
            .first()
            .map(|(command, _)| *command)
            .unwrap_or(self.name_key)
    }

    /// Resolve the relative script path for an invoked command name, honoring
    /// aliases (e.g. both `yarn` and `yarnpkg` resolve to the same script).
    pub fn script_for_command(&self, command: &str) -> Option<&'static str> {
        self.bin_entries
            .iter()
            .find(|(name, _)| *name == command)
            .map(|(_, script)| *script)
    }

    /// Returns `true` if `command` is transparent for this tool: it may run
    /// even when the project pins a different tool entirely.
    pub fn is_transparent(&self, command: &str) -> bool {
        self.transparent_commands.contains(&command)
    }

    /// The built-in default version expression, integrity suffix included.
    pub fn default_version_expression(&self) -> VersionExpression {
        VersionExpression::Exact {
            version: semver::Version::parse(self.default_version)
                .expect("built-in default version must be valid semver"),
            integrity: Some(IntegritySuffix {
                algo: self.default_integrity.0,
                digest: self.default_integrity.1.to_string(),
            }),
        }
    }

    /// Render the tarball template for a resolved version.
    pub fn tarball_url(&self, version: &semver::Version) -> String {
        self.tarball_template
            .replace("{name}", self.registry_package)
            .replace("{version}", &version.to_string())
    }
}

const NPM: ToolConfig = ToolConfig {
    name_key: "npm",
    default_version: "10.5.0",
    default_integrity: (HashAlgo::Sha256, "c1a4b5e2f6d8a9b3c7e1f4d6a8b2c5e7f9a1b3d5c7e9f1a3b5d7c9e1f3a5b7c9"),
    registry_package: "npm",
    tarball_template: "https://registry.npmjs.org/{name}/-/{name}-{version}.tgz",
    bin_entries: &[("npm", "bin/npm-cli.js"), ("npx", "bin/npx-cli.js")],
    transparent_commands: &["exec"],
    transparent_default: "10.5.0",
};

const PNPM: ToolConfig = ToolConfig {
    name_key: "pnpm",
    default_version: "8.15.4",
    default_integrity: (HashAlgo::Sha256, "d2b5c6f3e7d9a0b4c8e2f5d7a9b3c6e8f0a2b4d6c8e0f2a4b6d8c0e2f4a6b8d0"),
    registry_package: "pnpm",
    tarball_template: "https://registry.npmjs.org/{name}/-/{name}-{version}.tgz",
    bin_entries: &[("pnpm", "bin/pnpm.cjs"), ("pnpx", "bin/pnpx.cjs")],
    transparent_commands: &["dlx"],
    transparent_default: "8.15.4",
};

const YARN_CLASSIC: ToolConfig = ToolConfig {
    name_key: "yarn-classic",
    default_version: "1.22.22",
    default_integrity: (HashAlgo::Sha1, "e3b5c7f9a1d3b5c7f9a1d3b5c7f9a1d3b5c7f9a1"),
    registry_package: "yarn",
    tarball_template: "https://registry.npmjs.org/{name}/-/{name}-{version}.tgz",
    bin_entries: &[("yarn", "bin/yarn.js"), ("yarnpkg", "bin/yarn.js")],
    transparent_commands: &["create"],
    transparent_default: "1.22.22",
};

const YARN_BERRY: ToolConfig = ToolConfig {
    name_key: "yarn-berry",
    default_version: "4.1.1",
    default_integrity: (HashAlgo::Sha256, "f4c6d8a0b2e4f6d8a0b2e4f6d8a0b2e4f6d8a0b2e4f6d8a0b2e4f6d8a0b2e4f6"),
    registry_package: "@yarnpkg/cli-dist",
    tarball_template: "https://repo.yarnpkg.com/{version}/packages/yarnpkg-cli/bin/yarn.js",
    bin_entries: &[("yarn", "bin/yarn.js"), ("yarnpkg", "bin/yarn.js")],
    transparent_commands: &["dlx", "create"],
    transparent_default: "4.1.1",
};

/// All built-in tool configurations, in a stable order.
pub const ALL_TOOLS: [&ToolConfig; 4] = [&NPM, &PNPM, &YARN_CLASSIC, &YARN_BERRY];

/// Look up the static configuration for a known tool. Returns `None` for
/// [`ToolName::Unknown`].
pub fn config_for(name: &ToolName) -> Option<&'static ToolConfig> {
    match name {
        ToolName::Npm => Some(&NPM),
        ToolName::Pnpm => Some(&PNPM),
        ToolName::YarnClassic => Some(&YARN_CLASSIC),
        ToolName::YarnBerry => Some(&YARN_BERRY),
        ToolName::Unknown(_) => None,
    }
}

/// Determine which family an invoked `argv[0]` command name belongs to.
/// `yarn`/`yarnpkg` are ambiguous between classic and berry until a version
/// is known — see [`resolve_family`].
pub fn lookup_command_family(command: &str) -> Option<CommandFamily> {
    match command {
        "npm" | "npx" => Some(CommandFamily::Npm),
        "pnpm" | "pnpx" => Some(CommandFamily::Pnpm),
        "yarn" | "yarnpkg" => Some(CommandFamily::Yarn),
        _ => None,
    }
}

/// Resolve a command family (and, for yarn, a known major version) into a
/// concrete [`ToolName`]. Yarn major `0` or `1` is classic; `2` and above is
/// berry. With no major known yet, classic is assumed (matching the
/// tool's historical default before corepack-style pinning existed).
pub fn resolve_family(family: CommandFamily, yarn_major: Option<u64>) -> ToolName {
    match family {
        CommandFamily::Npm => ToolName::Npm,
        CommandFamily::Pnpm => ToolName::Pnpm,
        CommandFamily::Yarn => match yarn_major {
            Some(major) if major >= 2 => ToolName::YarnBerry,
            _ => ToolName::YarnClassic,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tools_have_valid_default_versions() {
        for tool in ALL_TOOLS {
            let expr = tool.default_version_expression();
            assert!(matches!(expr, VersionExpression::Exact { .. }));
        }
    }

    #[test]
    fn canonical_command_matches_first_bin_entry() {
        assert_eq!(NPM.canonical_command(), "npm");
        assert_eq!(YARN_CLASSIC.canonical_command(), "yarn");
    }

    #[test]
    fn aliases_resolve_to_same_script() {
        assert_eq!(
            YARN_CLASSIC.script_for_command("yarn"),
            YARN_CLASSIC.script_for_command("yarnpkg")
        );
    }

    #[test]
    fn unknown_command_has_no_script() {
        assert_eq!(NPM.script_for_command("frobnicate"), None);
    }

    #[test]
    fn transparent_commands_are_tool_specific() {
        assert!(NPM.is_transparent("exec"));
        assert!(!NPM.is_transparent("dlx"));
        assert!(PNPM.is_transparent("dlx"));
    }

    #[test]
    fn lookup_command_family_covers_all_aliases() {
        assert_eq!(lookup_command_family("npm"), Some(CommandFamily::Npm));
        assert_eq!(lookup_command_family("npx"), Some(CommandFamily::Npm));
        assert_eq!(lookup_command_family("pnpx"), Some(CommandFamily::Pnpm));
        assert_eq!(lookup_command_family("yarnpkg"), Some(CommandFamily::Yarn));
        assert_eq!(lookup_command_family("bogus"), None);
    }

    #[test]
    fn resolve_family_picks_yarn_variant_by_major() {
        assert_eq!(
            resolve_family(CommandFamily::Yarn, Some(1)),
            ToolName::YarnClassic
        );
        assert_eq!(
            resolve_family(CommandFamily::Yarn, Some(2)),
            ToolName::YarnBerry
        );
        assert_eq!(
            resolve_family(CommandFamily::Yarn, Some(4)),
            ToolName::YarnBerry
        );
        assert_eq!(
            resolve_family(CommandFamily::Yarn, None),
            ToolName::YarnClassic
        );
    }

    #[test]
    fn config_for_known_tools() {
        assert!(config_for(&ToolName::Npm).is_some());
        assert!(config_for(&ToolName::Unknown("x".into())).is_none());
    }

    #[test]
    fn tarball_url_substitutes_placeholders() {
        let version = semver::Version::parse("6.14.2").unwrap();
        let url = NPM.tarball_url(&version);
        assert_eq!(url, "https://registry.npmjs.org/npm/-/npm-6.14.2.tgz");
    }
}
