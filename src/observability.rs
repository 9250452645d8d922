//! Tracing subscriber setup for host binaries.
//!
//! The library itself only emits `tracing` events; hosts that want to see
//! them call one of these helpers once at startup.
//!
//! ## Example
//!
//! ```rust,ignore
//! promptline::observability::init_from_env();
//! ```

use tracing_subscriber::EnvFilter;

/// Initialize a text-format subscriber filtered by `RUST_LOG`, defaulting to
/// `info` for this crate when the variable is unset.
///
/// Calling this more than once, or after the host installed its own
/// subscriber, is harmless: the second initialization is ignored.
pub fn init_from_env() {
    init_with_directive("promptline=info");
}

/// Initialize a text-format subscriber with an explicit default filter
/// directive, still overridable through `RUST_LOG`.
pub fn init_with_directive(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_tolerated() {
        init_from_env();
        init_from_env();
        init_with_directive("promptline=debug");
    }
}
