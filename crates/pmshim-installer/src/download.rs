//! Streams a tarball off the wire and verifies its hash.
//!
//! The response body is read chunk-by-chunk via [`reqwest::Response::chunk`]
//! (no `futures`-style stream combinators needed for that, just the
//! `stream` feature already on), so the hash is fed incrementally as bytes
//! arrive rather than after the full body has landed — matching the
//! ordering guarantee that hashing happens inline with the transfer. An
//! `indicatif` progress bar rides along the same loop, falling back to a
//! spinner when the server doesn't report `Content-Length`.

use indicatif::{ProgressBar, ProgressStyle};
use pmshim_integrity::Hasher;
use pmshim_types::{HashAlgo, IntegritySuffix, PmError};
use tracing::debug;

fn user_agent() -> String {
    format!("pmshim/{}", env!("CARGO_PKG_VERSION"))
}

fn progress_bar(total: Option<u64>, url: &url::Url) -> ProgressBar {
    let bar = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {bytes}/{total_bytes} {wide_bar:.cyan/blue} {msg}",
    ) {
        bar.set_style(style);
    }
    bar.set_message(url.to_string());
    bar
}

async fn fetch(
    client: &reqwest::Client,
    url: &url::Url,
    algo: Option<HashAlgo>,
) -> Result<(Vec<u8>, Option<Hasher>), PmError> {
    let mut response = client
        .get(url.clone())
        .header("User-Agent", user_agent())
        .send()
        .await
        .map_err(|err| PmError::Other(format!("download request failed: {err}")))?;

    let bar = progress_bar(response.content_length(), url);
    let mut body = Vec::new();
    let mut hasher = algo.map(Hasher::new);
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| PmError::Other(format!("download body failed: {err}")))?
    {
        bar.inc(chunk.len() as u64);
        if let Some(hasher) = hasher.as_mut() {
            hasher.update(&chunk);
        }
        body.extend_from_slice(&chunk);
    }
    bar.finish_and_clear();
    Ok((body, hasher))
}

fn hash_incrementally(data: &[u8], algo: HashAlgo) -> String {
    let mut hasher = Hasher::new(algo);
    hasher.update(data);
    hasher.finalize_hex()
}

/// Verify `data`'s digest under `expected.algo` matches `expected.digest`.
/// Mismatch is fatal; the caller must discard `data` rather than cache it.
pub fn verify(data: &[u8], expected: &IntegritySuffix) -> Result<(), PmError> {
    verify_with_hasher(hash_incrementally(data, expected.algo), expected)
}

fn verify_with_hasher(actual: String, expected: &IntegritySuffix) -> Result<(), PmError> {
    if actual.eq_ignore_ascii_case(&expected.digest) {
        Ok(())
    } else {
        Err(PmError::HashMismatch {
            expected: expected.to_string(),
            actual: format!("{}.{}", expected.algo.as_str(), actual),
        })
    }
}

/// Fetch `url`, optionally printing the one-line download notice first, and
/// verify the result against `expected` when a digest was supplied.
pub async fn download_and_verify(
    client: &reqwest::Client,
    url: &url::Url,
    expected: Option<&IntegritySuffix>,
    emit_notice: bool,
) -> Result<Vec<u8>, PmError> {
    if emit_notice {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Downloading {url}...");
        }
    }
    debug!("downloading {url}");
    let (data, hasher) = fetch(client, url, expected.map(|e| e.algo)).await?;
    if let (Some(expected), Some(hasher)) = (expected, hasher) {
        verify_with_hasher(hasher.finalize_hex(), expected)?;
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_digest() {
        let digest = hash_incrementally(b"hello world", HashAlgo::Sha256);
        let expected = IntegritySuffix {
            algo: HashAlgo::Sha256,
            digest,
        };
        assert!(verify(b"hello world", &expected).is_ok());
    }

    #[test]
    fn verify_rejects_mismatched_digest() {
        let expected = IntegritySuffix {
            algo: HashAlgo::Sha256,
            digest: "0".repeat(64),
        };
        let err = verify(b"hello world", &expected).unwrap_err();
        assert!(matches!(err, PmError::HashMismatch { .. }));
    }

    #[test]
    fn progress_bar_uses_a_determinate_length_when_known() {
        let url = url::Url::parse("https://example.invalid/tool.tgz").unwrap();
        let bar = progress_bar(Some(1024), &url);
        assert_eq!(bar.length(), Some(1024));
    }

    #[test]
    fn progress_bar_falls_back_to_a_spinner_without_content_length() {
        let url = url::Url::parse("https://example.invalid/tool.tgz").unwrap();
        let bar = progress_bar(None, &url);
        assert_eq!(bar.length(), None);
    }
}
