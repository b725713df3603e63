//! ci-bot-config
//!
//! Validates the main, job and plugin configuration of the GitHub automation
//! bot before it is deployed.

use anyhow::Result;
use ci_bot_config::cli::check;
use ci_bot_config::cli::{Cli, Command, builtin_registry};
use ci_bot_config::logging::{self, LogTarget};
use clap::Parser;
use tracing::error;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = builtin_registry();
    match cli.command {
        Command::Check(args) => {
            let report = check::run(&args, &registry)?;
            println!("{}", report.render(args.format)?);
        }
        Command::Plugins => {
            for (name, description) in registry.iter() {
                println!("{:<24} {}", name, description);
            }
        }
    }
    Ok(())
}
