use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use engine_processing::coordinator::{execute, inspect};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "purchase-backfill",
    version = "0.1.0",
    about = "Backfill historical purchases into the Conversions API"
)]
struct Cli {
    #[arg(long, global = true, help = "Log at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            args,
            dry_run,
            output,
        } => {
            let env = args.environment()?;
            let config = args.resolve(&env, dry_run)?;
            let source = args.source()?;

            let summary = execute(config, &source).await?;
            if !summary.success {
                warn!(failed = summary.failed, "Some batches were not delivered");
            }

            match output {
                Some(path) => {
                    output::write_report(&summary, &path).await?;
                    info!(path = %path, "Summary written");
                }
                None => output::print_report(&summary)?,
            }
        }
        Commands::Inspect { args, limit } => {
            let env = args.environment()?;
            // Inspecting never talks to the API, so a token is not required.
            let config = args.resolve(&env, true)?;
            config.validate()?;

            let mut source = args.source()?.open().await?;
            let rows = inspect(&config, source.as_mut(), limit).await?;
            output::print_report(&rows)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
