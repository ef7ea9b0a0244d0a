//! Process-wide logging setup.
//!
//! Call sites use the `log` macros; the subscriber installed here also forwards
//! those records, so `RUST_LOG` filtering applies to both.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global subscriber. `default_level` applies when `RUST_LOG` is unset.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init();

        if let Err(err) = result {
            eprintln!("ipvault: logging already initialised elsewhere: {err}");
        }
    });
}
