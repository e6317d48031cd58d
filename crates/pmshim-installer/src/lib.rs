//! C9 — Fetcher & Installer.
//!
//! Turns a [`pmshim_types::SpecRequest`] into a concrete
//! [`pmshim_types::Resolution`] plus a ready cache entry: resolving
//! ranges/tags against the registry when needed, streaming and verifying an
//! artifact, extracting it, and installing it atomically into the cache.

mod download;
mod ensure;
mod extract;

pub use ensure::Installer;
