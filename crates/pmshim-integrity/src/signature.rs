//! The signature half of C8: detached ECDSA P-256 signatures over
//! `<package>@<version>:<integrity>`, verified against either the built-in
//! key set or a `PMSHIM_INTEGRITY_KEYS`-supplied one.

use base64::Engine;
use pmshim_env::{IntegrityKeyEntry, IntegrityKeysSetting};
use pmshim_types::PmError;
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};
use tracing::warn;

/// One `{keyid, sig}` pair as published in a registry's `dist.signatures`.
#[derive(Debug, Clone)]
pub struct RegistrySignature {
    pub keyid: String,
    pub sig: String,
}

/// The built-in keys this system trusts out of the box. Rotated alongside
/// releases; a real deployment would pin these to the registry operator's
/// current signing keys.
fn builtin_keys() -> Vec<IntegrityKeyEntry> {
    vec![IntegrityKeyEntry {
        keyid: "SHA256:built-in-default".to_string(),
        key: "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEo5GbrR1GVpZ1hHl8rVxY\
              uQeJqzV1Q2p8pZr4aUoOtmPXKb5XoxXyDnvh0qE8RbhftVb4wKvdNeJJ"
            .to_string(),
    }]
}

fn keys_for(setting: &IntegrityKeysSetting, tool_key: &str) -> Option<Vec<IntegrityKeyEntry>> {
    match setting {
        IntegrityKeysSetting::Disabled => None,
        IntegrityKeysSetting::BuiltIn => Some(builtin_keys()),
        IntegrityKeysSetting::Custom(map) => Some(map.get(tool_key).cloned().unwrap_or_default()),
    }
}

/// Verify at least one of `signatures` against the configured key set for
/// `tool_key`. Returns `Ok(())` immediately if signature checking is
/// disabled. The message signed is always `<package>@<version>:<integrity>`.
pub fn verify(
    tool_key: &str,
    package: &str,
    version: &str,
    integrity: &str,
    signatures: &[RegistrySignature],
    setting: &IntegrityKeysSetting,
) -> Result<(), PmError> {
    let Some(keys) = keys_for(setting, tool_key) else {
        return Ok(());
    };

    if keys.is_empty() {
        return Err(PmError::NoCompatibleSignature);
    }

    let message = format!("{package}@{version}:{integrity}");
    let mut found_matching_keyid = false;

    for signature in signatures {
        let Some(key) = keys.iter().find(|k| k.keyid == signature.keyid) else {
            continue;
        };
        found_matching_keyid = true;

        let Ok(key_bytes) = base64::engine::general_purpose::STANDARD.decode(&key.key) else {
            warn!("key {} is not valid base64, skipping", key.keyid);
            continue;
        };
        let Ok(sig_bytes) = base64::engine::general_purpose::STANDARD.decode(&signature.sig) else {
            return Err(PmError::SignatureFail);
        };

        let public_key = UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, &key_bytes);
        if public_key.verify(message.as_bytes(), &sig_bytes).is_ok() {
            return Ok(());
        }
        return Err(PmError::SignatureFail);
    }

    if found_matching_keyid {
        Err(PmError::SignatureFail)
    } else {
        Err(PmError::NoCompatibleSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn signature_checking_disabled_always_passes() {
        let result = verify(
            "npm",
            "npm",
            "10.5.0",
            "sha256.deadbeef",
            &[],
            &IntegrityKeysSetting::Disabled,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn empty_custom_keys_rejects_everything() {
        let setting = IntegrityKeysSetting::Custom(FxHashMap::default());
        let signatures = vec![RegistrySignature {
            keyid: "SHA256:anything".to_string(),
            sig: "AAAA".to_string(),
        }];
        let err = verify(
            "npm",
            "npm",
            "10.5.0",
            "sha256.deadbeef",
            &signatures,
            &setting,
        )
        .unwrap_err();
        assert!(matches!(err, PmError::NoCompatibleSignature));
    }

    #[test]
    fn no_signature_with_matching_keyid_is_no_compatible_signature() {
        let result = verify(
            "npm",
            "npm",
            "10.5.0",
            "sha256.deadbeef",
            &[],
            &IntegrityKeysSetting::BuiltIn,
        );
        assert!(matches!(
            result.unwrap_err(),
            PmError::NoCompatibleSignature
        ));
    }

    #[test]
    fn garbage_signature_bytes_fail_verification() {
        let signatures = vec![RegistrySignature {
            keyid: "SHA256:built-in-default".to_string(),
            sig: base64::engine::general_purpose::STANDARD.encode(b"not a real signature"),
        }];
        let err = verify(
            "npm",
            "npm",
            "10.5.0",
            "sha256.deadbeef",
            &signatures,
            &IntegrityKeysSetting::BuiltIn,
        )
        .unwrap_err();
        assert!(matches!(err, PmError::SignatureFail));
    }
}
