use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use redirects::{normalize_request_path, Redirects, Resolution};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Generate HTML redirect pages from a redirects file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a redirect page for every rule into OUTPUT_DIR.
    Build {
        source_dir: PathBuf,
        output_dir: PathBuf,
    },
    /// Print where PATH redirects to.
    Resolve { source_dir: PathBuf, path: String },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redirects=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Build {
            source_dir,
            output_dir,
        } => {
            let summary = redirects::compile(&source_dir, &output_dir)?;
            tracing::info!(
                rules = summary.rules,
                pages = summary.pages.len(),
                "[redirect] Done"
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Resolve { source_dir, path } => {
            let Some(redirects) = Redirects::load(&source_dir)
                .with_context(|| format!("loading redirects from {}", source_dir.display()))?
            else {
                eprintln!("no redirects file in {}", source_dir.display());
                return Ok(ExitCode::FAILURE);
            };
            let normalized = normalize_request_path(&path)?;
            match redirects.table.resolve(&normalized) {
                Resolution::Found(target) => {
                    println!("{}", target.href(&redirects.options.base));
                    Ok(ExitCode::SUCCESS)
                }
                Resolution::NotFound => {
                    eprintln!("no redirect for {path}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
