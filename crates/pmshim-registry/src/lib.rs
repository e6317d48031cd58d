//! C7 — Registry Client.
//!
//! Fetches package-manager metadata documents and selects a concrete
//! version out of them.

mod client;
mod document;

pub use client::{resolve_tarball_url, RegistryClient};
pub use document::{select_version, DistInfo, RegistryDocument, SelectedVersion, SignatureEntry};
