//! graphe - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphe::config::Config;
use graphe::model::GeminiClient;
use graphe::pipeline::{self, AutoAcceptReviewer, Outcome, Reviewer, TermReviewer};

/// Generate a conventional commit message for staged changes and commit.
#[derive(Parser, Debug)]
#[command(name = "graphe")]
#[command(about = "Generate a commit message for staged changes using Gemini")]
#[command(version)]
struct Cli {
    /// Directory inside the target repository (defaults to the current directory)
    #[arg(short = 'C', long = "dir", default_value = ".")]
    dir: PathBuf,

    /// Print the generated message without committing
    #[arg(long)]
    dry_run: bool,

    /// Accept the first valid message without prompting
    #[arg(short = 'y', long)]
    yes: bool,

    /// Verbose logging (equivalent to RUST_LOG=graphe=debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("graphe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("graphe=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let client = GeminiClient::new(&config);

    let mut term = TermReviewer;
    let mut auto = AutoAcceptReviewer;
    let reviewer: &mut dyn Reviewer = if cli.yes || cli.dry_run {
        &mut auto
    } else {
        &mut term
    };

    let outcome = pipeline::run(&cli.dir, &client, reviewer, &config, cli.dry_run).await;

    match &outcome {
        Outcome::Done { oid, message } => {
            println!("Committed {}: {}", short_oid(oid), message.header());
        }
        Outcome::Previewed { message } => {
            println!("{}", message.render());
        }
        Outcome::Aborted(reason) => {
            eprintln!("Aborted: {reason}");
        }
    }

    ExitCode::from(outcome.exit_code() as u8)
}

fn short_oid(oid: &git2::Oid) -> String {
    oid.to_string().chars().take(7).collect()
}
