//! storefront-probe: run browser journeys against the demo store
//!
//! ## Usage
//!
//! ```bash
//! storefront-probe auth                      # save tests/auth/user.json
//! storefront-probe run                       # every journey
//! storefront-probe run --tag smoke --headless
//! storefront-probe run --id TC09 --profile slow -v
//! storefront-probe list --json
//! storefront-probe config --base-url https://staging.example.com
//! ```

use clap::Parser;
use std::process::ExitCode;
use storefront_probe::logging;
use storefront_probe_cli::{
    handlers, running_in_ci, Cli, CliConfig, CliResult, Commands, Verbosity,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);

    if let Err(e) = logging::init(config.verbosity.log_level(), config.log_format()) {
        eprintln!("Warning: {e}");
    }

    match run(&config, &cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(config: &CliConfig, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Run(args) => handlers::execute_run(config, args),
        Commands::Auth(args) => handlers::execute_auth(args),
        Commands::List(args) => handlers::execute_list(args),
        Commands::Config(args) => handlers::execute_config(args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_json_logs(cli.log_format.is_json(running_in_ci()))
}
