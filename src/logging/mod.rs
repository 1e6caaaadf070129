//! Console logging setup.
//!
//! Everything in the crate logs through `tracing` macros; this installs the
//! subscriber that decides where that output goes. `RUST_LOG` takes
//! precedence over the `--debug` switch.

use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) {
    let default_level = if debug { "ircbot=debug" } else { "ircbot=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
