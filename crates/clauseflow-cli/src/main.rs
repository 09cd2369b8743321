//! ClauseFlow CLI - Structural indexing of contracts and purchase orders.

use clap::Parser;
use clauseflow_cli::commands;
use clauseflow_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays parseable; RUST_LOG wins over -v.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> clauseflow_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Index(args) => commands::execute_index(args, &config, &formatter).await?,
        Command::Segment(args) => commands::execute_segment(args, &config, &formatter).await?,
        Command::Lines(args) => commands::execute_lines(args)?,
        Command::Match(args) => commands::execute_match(args, &formatter)?,
        Command::Reference(args) => {
            commands::execute_reference(args, &config, &formatter).await?
        }
        Command::Profile(args) => commands::execute_profile(args, &mut config, &formatter)?,
    }

    Ok(())
}
