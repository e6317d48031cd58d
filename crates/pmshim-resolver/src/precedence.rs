//! The precedence chain itself: inline CLI override, then project manifest
//! (reconciling `packageManager` against `devEngines.packageManager`), then
//! the global last-known-good pin, then the built-in default.

use std::path::Path;

use pmshim_cache::LastKnownGood;
use pmshim_config::{self, resolve_family, CommandFamily};
use pmshim_env::EnvFlags;
use pmshim_manifest::{
    check_url_for_known_tool, locate, parse_cli_spec, parse_dev_engines_package_manager,
    parse_package_manager_field, DevEnginesOutcome,
};
use pmshim_types::{OnFail, PmError, SpecLocator, SpecRequest, ToolName, VersionExpression};
use tracing::warn;

/// Everything the precedence chain needs besides the command itself.
pub struct ResolveContext<'a> {
    pub env: &'a EnvFlags,
    pub cwd: &'a Path,
    pub last_known_good: &'a LastKnownGood,
}

/// Determine the winning [`SpecRequest`] for an invocation of `command_name`
/// (optionally with `subcommand` as its first argument and `inline_spec` as
/// an explicit `name@version` override).
pub fn resolve(
    command_name: &str,
    subcommand: Option<&str>,
    inline_spec: Option<&str>,
    ctx: &ResolveContext,
) -> Result<SpecRequest, PmError> {
    if let Some(raw) = inline_spec {
        let request = parse_cli_spec(raw)?;
        check_url_for_known_tool(&request.name, &request.version, ctx.env.enable_unsafe_custom_urls)?;
        return Ok(request);
    }

    if ctx.env.enable_project_spec {
        if let Some(located) = locate(ctx.cwd) {
            if let Some(request) = resolve_from_manifest(&located, ctx)? {
                check_url_for_known_tool(
                    &request.name,
                    &request.version,
                    ctx.env.enable_unsafe_custom_urls,
                )?;
                return Ok(request);
            }
        }
    }

    let family = pmshim_config::lookup_command_family(command_name);
    if let Some(family) = family {
        if let Some(request) = resolve_from_global_pin(family, ctx) {
            return Ok(request);
        }
        return Ok(builtin_default(resolve_family(family, None)));
    }

    // An unrecognized command name with no manifest and no inline spec: fall
    // back to treating it as its own unknown tool, which has no built-in
    // default to offer.
    Err(PmError::Other(format!(
        "no package manager configuration found for `{command_name}`"
    )))
}

fn resolve_from_manifest(
    located: &pmshim_manifest::LocatedManifest,
    ctx: &ResolveContext,
) -> Result<Option<SpecRequest>, PmError> {
    let path = located.path.clone();
    let pm_request = located
        .manifest
        .package_manager
        .as_deref()
        .map(|raw| parse_package_manager_field(raw, SpecLocator::ProjectManifest(path.clone())))
        .transpose()?;

    let dev_engines_value = located
        .manifest
        .dev_engines
        .as_ref()
        .and_then(|engines| engines.package_manager.as_ref());
    let dev_engines_outcome = parse_dev_engines_package_manager(dev_engines_value);

    let constraint = match dev_engines_outcome {
        DevEnginesOutcome::Absent => None,
        DevEnginesOutcome::Constraint(constraint) => Some(constraint),
        DevEnginesOutcome::Malformed(message) => {
            warn!("{message}");
            None
        }
    };

    match (pm_request, constraint) {
        (Some(pm_request), Some(constraint)) => {
            reconcile(&pm_request, constraint, &path)?;
            Ok(Some(pm_request))
        }
        (Some(pm_request), None) => Ok(Some(pm_request)),
        (None, Some(constraint)) => {
            let Some(range) = constraint.version_range.as_deref() else {
                return Err(PmError::SpecRange);
            };
            let version = semver::Version::parse(range).map_err(|_| PmError::SpecRange)?;
            Ok(Some(SpecRequest {
                name: constraint.name,
                version: VersionExpression::Exact {
                    version,
                    integrity: None,
                },
                locator: SpecLocator::ProjectDevEngines(path),
                on_fail: Some(constraint.on_fail),
            }))
        }
        (None, None) => Ok(None),
    }
}

fn reconcile(
    pm_request: &SpecRequest,
    constraint: pmshim_manifest::DevEnginesConstraint,
    path: &Path,
) -> Result<(), PmError> {
    if pm_request.name != constraint.name {
        let message = format!(
            "\"{}\" does not match the value defined in \"devEngines.packageManager\" (\"{}\")",
            pm_request.name, constraint.name
        );
        return apply_on_fail(constraint.on_fail, message);
    }

    if let Some(range) = constraint.version_range.as_deref() {
        let VersionExpression::Exact { version, .. } = &pm_request.version else {
            let message = format!(
                "{path:?}: packageManager must carry an exact version to satisfy devEngines.packageManager"
            );
            return apply_on_fail(constraint.on_fail, message);
        };
        let req = semver::VersionReq::parse(range).map_err(|_| PmError::SpecRange)?;
        if !req.matches(version) {
            let message = format!(
                "\"{version}\" does not match the value defined in \"devEngines.packageManager\" (\"{range}\")"
            );
            return apply_on_fail(constraint.on_fail, message);
        }
    }

    Ok(())
}

fn apply_on_fail(on_fail: OnFail, message: String) -> Result<(), PmError> {
    match on_fail {
        OnFail::Error => Err(PmError::DevEnginesMismatch(message)),
        OnFail::Warn => {
            warn!("{message}");
            Ok(())
        }
        OnFail::Ignore => Ok(()),
    }
}

fn resolve_from_global_pin(family: CommandFamily, ctx: &ResolveContext) -> Option<SpecRequest> {
    let candidate_name = resolve_family(family, None);
    let config = pmshim_config::config_for(&candidate_name)?;
    let builtin_major = semver::Version::parse(config.default_version)
        .expect("built-in default is valid semver")
        .major;

    let pinned = ctx.last_known_good.get(&candidate_name)?;
    if pinned.major != builtin_major {
        return None;
    }

    Some(SpecRequest {
        name: candidate_name,
        version: VersionExpression::Exact {
            version: pinned.clone(),
            integrity: None,
        },
        locator: SpecLocator::GlobalPin,
        on_fail: None,
    })
}

fn builtin_default(name: ToolName) -> SpecRequest {
    let config = pmshim_config::config_for(&name).expect("known tool always has a config");
    SpecRequest {
        name,
        version: config.default_version_expression(),
        locator: SpecLocator::BuiltinDefault,
        on_fail: None,
    }
}
