//! The hash half of C8: incremental digest computation and comparison
//! against an [`IntegritySuffix`], identified by its algorithm prefix.

use pmshim_types::{HashAlgo, IntegritySuffix, PmError};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha512};

/// An incremental hasher over one of the four supported algorithms, fed
/// chunk-by-chunk as a download streams in.
pub enum Hasher {
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    pub fn new(algo: HashAlgo) -> Self {
        match algo {
            HashAlgo::Sha1 => Self::Sha1(Sha1::new()),
            HashAlgo::Sha224 => Self::Sha224(Sha224::new()),
            HashAlgo::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgo::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha1(hasher) => Digest::update(hasher, chunk),
            Self::Sha224(hasher) => Digest::update(hasher, chunk),
            Self::Sha256(hasher) => Digest::update(hasher, chunk),
            Self::Sha512(hasher) => Digest::update(hasher, chunk),
        }
    }

    pub fn finalize_hex(self) -> String {
        match self {
            Self::Sha1(hasher) => hex::encode(Digest::finalize(hasher)),
            Self::Sha224(hasher) => hex::encode(Digest::finalize(hasher)),
            Self::Sha256(hasher) => hex::encode(Digest::finalize(hasher)),
            Self::Sha512(hasher) => hex::encode(Digest::finalize(hasher)),
        }
    }
}

/// Verify that `data`'s digest under `expected.algo` matches `expected.digest`
/// (case-insensitively). Mismatch is always fatal; the caller must not cache
/// the bytes on failure.
pub fn verify_bytes(data: &[u8], expected: &IntegritySuffix) -> Result<(), PmError> {
    let mut hasher = Hasher::new(expected.algo);
    hasher.update(data);
    let actual = hasher.finalize_hex();
    if actual.eq_ignore_ascii_case(&expected.digest) {
        Ok(())
    } else {
        Err(PmError::HashMismatch {
            expected: expected.to_string(),
            actual: format!("{}.{}", expected.algo.as_str(), actual),
        })
    }
}

/// Parse a registry-supplied `dist.integrity` string, which this system
/// formats identically to a project's integrity suffix: `<algo>.<hex>`.
pub fn parse_integrity_string(raw: &str) -> Result<IntegritySuffix, PmError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_sha256_digest() {
        let digest = {
            let mut hasher = Hasher::new(HashAlgo::Sha256);
            hasher.update(b"hello world");
            hasher.finalize_hex()
        };
        let expected = IntegritySuffix {
            algo: HashAlgo::Sha256,
            digest,
        };
        assert!(verify_bytes(b"hello world", &expected).is_ok());
    }

    #[test]
    fn rejects_mismatched_digest() {
        let expected = IntegritySuffix {
            algo: HashAlgo::Sha256,
            digest: "0".repeat(64),
        };
        let err = verify_bytes(b"hello world", &expected).unwrap_err();
        assert!(matches!(err, PmError::HashMismatch { .. }));
    }

    #[test]
    fn digest_comparison_is_case_insensitive() {
        let mut hasher = Hasher::new(HashAlgo::Sha1);
        hasher.update(b"data");
        let digest = hasher.finalize_hex().to_uppercase();
        let expected = IntegritySuffix {
            algo: HashAlgo::Sha1,
            digest,
        };
        assert!(verify_bytes(b"data", &expected).is_ok());
    }

    #[test]
    fn parses_integrity_string() {
        let suffix = parse_integrity_string("sha512.deadbeef").unwrap();
        assert_eq!(suffix.algo, HashAlgo::Sha512);
        assert_eq!(suffix.digest, "deadbeef");
    }

    #[test]
    fn rejects_unknown_algorithm_prefix() {
        assert!(parse_integrity_string("md5.deadbeef").is_err());
    }
}
