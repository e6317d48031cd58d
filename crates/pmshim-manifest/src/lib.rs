//! C4 (Spec Parser) and C5 (Project Locator): turning a project manifest and
//! CLI arguments into [`pmshim_types::SpecRequest`] values, and finding the
//! nearest manifest that declares one.

mod dev_engines;
mod locator;
mod raw;
mod spec;
mod write;

pub use dev_engines::{parse_dev_engines_package_manager, DevEnginesConstraint, DevEnginesOutcome};
pub use locator::{locate, locate_nearest_manifest_path, LocatedManifest};
pub use raw::{RawDevEngines, RawManifest};
pub use spec::{
    check_url_for_known_tool, parse_cli_spec, parse_on_fail, parse_package_manager_field,
    tool_name_from_str,
};
pub use write::{format_package_manager_value, write_package_manager_field};
