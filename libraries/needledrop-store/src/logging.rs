//! Tracing subscriber setup for hosts embedding the store

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVES: &str =
    "needledrop_store=info,needledrop_archive=info,needledrop_playback=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_directives` when `RUST_LOG` is unset or invalid.
/// Errors if a global subscriber is already installed.
pub fn init_logging(default_directives: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let _ = init_logging(DEFAULT_DIRECTIVES);
        assert!(init_logging(DEFAULT_DIRECTIVES).is_err());
    }
}
