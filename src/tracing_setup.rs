//! Tracing subscriber setup shared by both binaries

use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber when `--debug` is passed or `RUST_LOG` is set
///
/// `--debug` forces DEBUG level; otherwise `RUST_LOG` decides. With neither,
/// no subscriber is installed and library logging stays silent. Call once per
/// process: a second call panics.
pub fn init_tracing(debug: bool) {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    if !debug && !from_env {
        return;
    }

    let mut filter = EnvFilter::from_default_env();
    if debug {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
