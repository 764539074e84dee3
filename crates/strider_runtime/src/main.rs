//! Strider Runtime
//!
//! Drives a player back and forth across an endless strip of chunks,
//! streaming content in ahead of it and tearing it down behind it.
//!
//! Run with: cargo run -p strider_runtime
//!       or: STRIDER_CONFIG=strider.toml cargo run --bin strider

mod app;
mod config;
mod error;

use app::App;
use config::RuntimeConfig;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    log::info!("Strider v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> error::Result<()> {
    let config = RuntimeConfig::load()?;
    config.print_summary();

    let stats = App::new(config)?.run()?;
    log::info!("Shutdown after {} ticks", stats.ticks);
    Ok(())
}
