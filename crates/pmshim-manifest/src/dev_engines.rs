//! `devEngines.packageManager` parsing. An object is a constraint; an array,
//! string, or number is a malformed shape — warn and ignore rather than
//! fail the run.

use pmshim_types::{OnFail, ToolName};
use serde::Deserialize;
use serde_json::Value;

use crate::spec::{parse_on_fail, tool_name_from_str};

/// A `devEngines.packageManager` constraint, once shaped as an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevEnginesConstraint {
    pub name: ToolName,
    /// A semver range string, when present. Acts only as an assertion — it
    /// is never a source of a concrete version.
    pub version_range: Option<String>,
    pub on_fail: OnFail,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    name: String,
    version: Option<String>,
    #[serde(rename = "onFail")]
    on_fail: Option<String>,
}

/// The result of parsing a `devEngines.packageManager` value.
pub enum DevEnginesOutcome {
    /// No `devEngines.packageManager` entry at all.
    Absent,
    /// A valid object constraint.
    Constraint(DevEnginesConstraint),
    /// An array, string, or number: malformed shape. Carries the warning
    /// message the caller should emit to stderr before ignoring it.
    Malformed(String),
}

pub fn parse_dev_engines_package_manager(value: Option<&Value>) -> DevEnginesOutcome {
    let Some(value) = value else {
        return DevEnginesOutcome::Absent;
    };

    match value {
        Value::Object(_) => match serde_json::from_value::<RawObject>(value.clone()) {
            Ok(raw) => {
                let name = tool_name_from_str(&raw.name, None);
                DevEnginesOutcome::Constraint(DevEnginesConstraint {
                    name,
                    version_range: raw.version,
                    on_fail: parse_on_fail(raw.on_fail.as_deref()),
                })
            }
            Err(err) => DevEnginesOutcome::Malformed(format!(
                "devEngines.packageManager is shaped incorrectly: {err}"
            )),
        },
        Value::Array(_) => DevEnginesOutcome::Malformed(
            "devEngines.packageManager must be an object, not an array; ignoring".to_string(),
        ),
        Value::String(_) => DevEnginesOutcome::Malformed(
            "devEngines.packageManager must be an object, not a string; ignoring".to_string(),
        ),
        Value::Number(_) => DevEnginesOutcome::Malformed(
            "devEngines.packageManager must be an object, not a number; ignoring".to_string(),
        ),
        _ => DevEnginesOutcome::Malformed(
            "devEngines.packageManager has an unsupported shape; ignoring".to_string(),
        ),
    }
}
