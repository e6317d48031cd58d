//! C8 — Integrity Verifier.
//!
//! Two independent checks on a fetched artifact: a hash digest against an
//! authoritative [`pmshim_types::IntegritySuffix`], and a detached signature
//! over the registry's own integrity string. Whether the signature check
//! runs at all is the caller's call — a project-supplied integrity suffix
//! bypasses it entirely (the user has asserted bit-exact content already).

mod hash;
mod signature;

pub use hash::{parse_integrity_string, verify_bytes, Hasher};
pub use signature::{verify as verify_signature, RegistrySignature};
