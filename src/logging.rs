//! Diagnostic output for the asset generators.

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

//===========================================================================//

/// Installs a stderr subscriber for the library's `tracing` events.  The
/// filter comes from `RUST_LOG`, falling back to `warn`; `verbose` forces
/// `debug`.  Stdout is left free for the tools' own messages.
pub fn init(verbose: bool) -> io::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init();
    match result {
        Ok(()) => Ok(()),
        Err(error) => Err(io::Error::new(io::ErrorKind::Other, error)),
    }
}

//===========================================================================//
