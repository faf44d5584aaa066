//! Tracing subscriber setup for the `tern` binary.

use std::io::IsTerminal;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber if `TERN_LOG` or `RUST_LOG` is set.
///
/// `TERN_LOG` wins when both are present. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match std::env::var("TERN_LOG") {
            Ok(directives) => EnvFilter::new(directives),
            Err(_) if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
            Err(_) => return,
        };
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(true)
            .with_level(true);
        // Another subscriber may already be installed by an embedding host.
        let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
    });
}
