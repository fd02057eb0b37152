// Main binary for the mayfly CLI
use clap::CommandFactory;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::stderr;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

// Reference the cmd module where subcommands live
mod cmd;
use cmd::submit::SubmitArgs;

// Define the command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Submit workflows and wait for completion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// Define the subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Submits a workflow manifest and blocks until it finishes.
    Submit(SubmitArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?; // Install better error handling

    let cli = Cli::parse();

    // Respect RUST_LOG, fall back to verbose/info for our crates and
    // silence noisy dependencies
    let default_level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "mayfly={level},mayfly_submit={level},kube=warn,hyper=warn,tower=warn,rustls=warn,h2=warn",
        level = default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .init();

    match cli.command {
        Some(Commands::Submit(args)) => {
            if let Err(e) = cmd::submit::run_submit(args).await {
                error!("Submission failed: {:#}", e);
                eprintln!("Error during submission: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
