//! Tracing setup for the CLI binary. Every library crate in the workspace
//! emits `tracing` events; this is the one place a subscriber is installed.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Install a global subscriber honoring `PMSHIM_LOG` (falling back to
/// `RUST_LOG`), with a compact single-line formatter by default and a
/// `tracing-tree` hierarchical layer under `--verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env("PMSHIM_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let registry = Registry::default().with(filter);

    if verbose {
        let tree = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true);
        registry.with(tree).init();
    } else {
        let fmt = tracing_subscriber::fmt::layer()
            .without_time()
            .with_target(false)
            .with_level(true);
        registry.with(fmt).init();
    }
}
