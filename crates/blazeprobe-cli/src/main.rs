//! Blazeprobe CLI: end-to-end journeys for the DemoBlaze storefront
//!
//! ## Usage
//!
//! ```bash
//! blazeprobe list                                # Show journeys
//! blazeprobe run --mock                          # All journeys, offline
//! blazeprobe run -j login_valid -j user_journey  # Selected journeys in Chrome
//! blazeprobe run --browser firefox --headed      # Visible Firefox window
//! blazeprobe config -c blazeprobe.yaml           # Effective configuration
//! ```

use blazeprobe_cli::{logging, runner, Cli, CliConfig, CliResult, Commands, Verbosity};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_json_logs(cli.json_logs);
    logging::init(&config);

    match cli.command {
        Commands::Run(args) => runner::run(&config, &args),
        Commands::List(args) => runner::list(&args),
        Commands::Config(args) => runner::show_config(&args),
    }
}
