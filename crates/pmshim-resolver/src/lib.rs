//! C6 — Resolver.
//!
//! Combines the precedence chain (inline spec > project manifest > global
//! pin > built-in default) with name-mismatch enforcement into the single
//! entry point the dispatcher calls before any fetch happens.

mod name_match;
mod precedence;

pub use name_match::check_name_match;
pub use precedence::{resolve as resolve_spec, ResolveContext};

use pmshim_types::{PmError, SpecRequest};

/// Run the full precedence chain, then enforce the name-mismatch rule
/// against the literal invocation. This is the function the dispatcher
/// calls; `resolve_spec` alone is exposed for callers (like `use`/`install`)
/// that don't have a literal invoked command to check against.
pub fn resolve(
    command_name: &str,
    subcommand: Option<&str>,
    inline_spec: Option<&str>,
    ctx: &ResolveContext,
) -> Result<SpecRequest, PmError> {
    let request = resolve_spec(command_name, subcommand, inline_spec, ctx)?;
    if inline_spec.is_none() {
        check_name_match(
            command_name,
            subcommand,
            &request.name,
            ctx.env.enable_strict,
        )?;
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmshim_cache::LastKnownGood;
    use pmshim_env::EnvFlags;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn name_mismatch_surfaces_through_full_resolve() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"packageManager":"yarn@1.22.4"}"#,
        )
        .unwrap();

        let empty = HashMap::new();
        let env = EnvFlags::resolve(&empty, &empty).unwrap();
        let lkg = LastKnownGood::default();
        let ctx = ResolveContext {
            env: &env,
            cwd: dir.path(),
            last_known_good: &lkg,
        };

        let err = resolve("npm", None, None, &ctx).unwrap_err();
        assert!(matches!(err, PmError::NameMismatch { .. }));
    }

    #[test]
    fn matching_name_resolves_cleanly() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"packageManager":"npm@6.14.2"}"#,
        )
        .unwrap();

        let empty = HashMap::new();
        let env = EnvFlags::resolve(&empty, &empty).unwrap();
        let lkg = LastKnownGood::default();
        let ctx = ResolveContext {
            env: &env,
            cwd: dir.path(),
            last_known_good: &lkg,
        };

        let resolution = resolve("npm", None, None, &ctx).unwrap();
        assert_eq!(resolution.name, pmshim_types::ToolName::Npm);
    }
}
