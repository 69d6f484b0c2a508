use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use relayd::{BootstrapError, StructuredHealthReporter, SystemConfigLoader, bootstrap_with};
use signal_hook::consts::{SIGINT, SIGTERM};

fn main() -> ExitCode {
    let relay = match bootstrap_with(&SystemConfigLoader, Arc::new(StructuredHealthReporter)) {
        Ok(relay) => relay,
        // Help and version requests also arrive here; clap picks the exit code.
        Err(BootstrapError::Configuration { source }) => source.exit(),
        Err(error) => {
            eprintln!("relayd: {error}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(error) = signal_hook::flag::register(signal, Arc::clone(&shutdown)) {
            eprintln!("relayd: failed to register signal handler: {error}");
            return ExitCode::FAILURE;
        }
    }

    relay.run(&shutdown);
    ExitCode::SUCCESS
}
