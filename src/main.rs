use clap::Parser;
use tracing_subscriber::EnvFilter;

use merge_eval::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag; stdout carries the results
    let filter = if cli.verbose {
        EnvFilter::new("merge_eval=debug,info")
    } else {
        EnvFilter::new("merge_eval=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Accuracy(args) => {
            cli::accuracy::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Calibrate(args) => {
            cli::calibrate::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::PerBase(args) => {
            cli::per_base::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Qualities(args) => {
            cli::qualities::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
