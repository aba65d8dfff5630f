// src/main.rs
use clap::Parser;
use coin_worker::{self, *};
use tokio::runtime::Builder;

/// Main entry point for the coin worker
///
/// # Returns
/// - `Ok(())` after a successful `config` run
/// - `Err(WorkerError)` if startup fails or the loop stops on an error
fn main() -> Result<(), WorkerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_worker(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the worker with the given options
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads the configuration and applies CLI overrides
/// 3. Connects to the counter store (fatal on failure)
/// 4. Runs the work loop on a single-threaded runtime
fn start_worker(opts: cli::StartOptions) -> Result<(), WorkerError> {
    utils::init_logging(opts.verbose);
    log::info!("Coin worker {} starting", env!("CARGO_PKG_VERSION"));

    let (path, required) = opts.config_path();
    let mut config = config::load(&path, required)?;
    opts.apply(&mut config);

    // One loop, one thread
    let rt = Builder::new_current_thread().enable_all().build()?;
    rt.block_on(async {
        let mut worker = Worker::connect(config).await?;
        worker.mine().await
    })
    .inspect_err(|e| log::error!("Worker stopped: {}", e))
}

/// Writes the configuration template to the requested file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), WorkerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
