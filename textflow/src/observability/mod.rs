//! Observability utilities.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber from `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset. Calling this more than
/// once is harmless: later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
