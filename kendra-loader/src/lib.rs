pub mod aws;
pub mod cli;
pub mod intent;
pub mod load_config;
pub mod query_cli;

pub use cli::{run, Cli, Commands};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber used by both binaries; `RUST_LOG` overrides `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
