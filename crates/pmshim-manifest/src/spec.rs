//! C4 — Spec Parser.
//!
//! Parses `packageManager` strings, `devEngines.packageManager` values, and
//! CLI `name[@versionOrRange]` specs into the shared [`SpecRequest`]
//! vocabulary.

use pmshim_types::{
    HashAlgo, IntegritySuffix, OnFail, PmError, SpecLocator, SpecRequest, ToolName,
    VersionExpression,
};

/// Map a manifest/CLI tool-name string to a [`ToolName`]. `yarn` is
/// ambiguous between classic and berry until a version is known; pass the
/// version's major once parsed to disambiguate (berry is major >= 2).
pub fn tool_name_from_str(name: &str, major: Option<u64>) -> ToolName {
    match name {
        "npm" => ToolName::Npm,
        "pnpm" => ToolName::Pnpm,
        "yarn" => match major {
            Some(major) if major >= 2 => ToolName::YarnBerry,
            _ => ToolName::YarnClassic,
        },
        other => ToolName::Unknown(other.to_string()),
    }
}

fn is_url_like(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

fn parse_integrity_suffix(raw: &str) -> Result<IntegritySuffix, PmError> {
    let (algo, digest) = raw.split_once('.').ok_or(PmError::SpecSyntax)?;
    let algo = HashAlgo::parse_prefix(algo).ok_or(PmError::SpecSyntax)?;
    if digest.is_empty() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PmError::SpecSyntax);
    }
    Ok(IntegritySuffix {
        algo,
        digest: digest.to_string(),
    })
}

/// Parse a `packageManager` field value: `<name>@<exact-version>[+<algo>.<hex>]`
/// or `<name>@<URL>[#<algo>.<hex>]`. A range, tag, or missing version is a
/// [`PmError::SpecSyntax`].
pub fn parse_package_manager_field(
    value: &str,
    locator: SpecLocator,
) -> Result<SpecRequest, PmError> {
    let (name_str, rest) = value.split_once('@').ok_or(PmError::SpecSyntax)?;
    if name_str.is_empty() || rest.is_empty() {
        return Err(PmError::SpecSyntax);
    }

    if is_url_like(rest) {
        let (url_part, integrity_part) = match rest.split_once('#') {
            Some((url, suffix)) => (url, Some(suffix)),
            None => (rest, None),
        };
        let url = url::Url::parse(url_part)?;
        let integrity = integrity_part.map(parse_integrity_suffix).transpose()?;
        let name = tool_name_from_str(name_str, None);
        return Ok(SpecRequest {
            name,
            version: VersionExpression::Url { url, integrity },
            locator,
            on_fail: None,
        });
    }

    let (version_part, integrity_part) = match rest.split_once('+') {
        Some((version, suffix)) => (version, Some(suffix)),
        None => (rest, None),
    };
    let version = semver::Version::parse(version_part).map_err(|_| PmError::SpecSyntax)?;
    let integrity = integrity_part.map(parse_integrity_suffix).transpose()?;
    let name = tool_name_from_str(name_str, Some(version.major));

    Ok(SpecRequest {
        name,
        version: VersionExpression::Exact { version, integrity },
        locator,
        on_fail: None,
    })
}

/// Parse a CLI spec: `<name>[@<versionOrRange>]`. Ranges and dist-tags are
/// permitted here (they are resolved against the registry), unlike in a
/// `packageManager` field.
pub fn parse_cli_spec(value: &str) -> Result<SpecRequest, PmError> {
    let Some((name_str, rest)) = value.split_once('@') else {
        return Ok(SpecRequest {
            name: tool_name_from_str(value, None),
            version: VersionExpression::Tag("latest".to_string()),
            locator: SpecLocator::Env,
            on_fail: None,
        });
    };
    if name_str.is_empty() || rest.is_empty() {
        return Err(PmError::SpecSyntax);
    }

    if is_url_like(rest) {
        let (url_part, integrity_part) = match rest.split_once('#') {
            Some((url, suffix)) => (url, Some(suffix)),
            None => (rest, None),
        };
        let url = url::Url::parse(url_part)?;
        let integrity = integrity_part.map(parse_integrity_suffix).transpose()?;
        return Ok(SpecRequest {
            name: tool_name_from_str(name_str, None),
            version: VersionExpression::Url { url, integrity },
            locator: SpecLocator::Env,
            on_fail: None,
        });
    }

    if let Ok(version) = semver::Version::parse(rest) {
        return Ok(SpecRequest {
            name: tool_name_from_str(name_str, Some(version.major)),
            version: VersionExpression::Exact {
                version,
                integrity: None,
            },
            locator: SpecLocator::Env,
            on_fail: None,
        });
    }

    let version = if looks_like_range(rest) {
        VersionExpression::Range(rest.to_string())
    } else {
        VersionExpression::Tag(rest.to_string())
    };

    Ok(SpecRequest {
        name: tool_name_from_str(name_str, None),
        version,
        locator: SpecLocator::Env,
        on_fail: None,
    })
}

fn looks_like_range(value: &str) -> bool {
    value
        .chars()
        .any(|c| matches!(c, '^' | '~' | '>' | '<' | '*' | 'x' | 'X') || c == '.')
        && semver::VersionReq::parse(value).is_ok()
}

/// Enforce the URL-for-known-tool rule: URL-typed version expressions are
/// illegal for the four known tools unless the unsafe-custom-URLs escape is
/// enabled. Always legal for an unknown/custom tool.
pub fn check_url_for_known_tool(
    name: &ToolName,
    version: &VersionExpression,
    allow_unsafe_custom_urls: bool,
) -> Result<(), PmError> {
    if matches!(version, VersionExpression::Url { .. })
        && name.is_known()
        && !allow_unsafe_custom_urls
    {
        return Err(PmError::UrlForKnownTool);
    }
    Ok(())
}

/// `devEngines.packageManager.onFail`, defaulting to [`OnFail::Error`] when
/// absent or unparsable.
pub fn parse_on_fail(raw: Option<&str>) -> OnFail {
    raw.and_then(OnFail::parse).unwrap_or_default()
}
