use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use redirects::Redirects;
use server::{app, DevRedirects};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
struct Args {
    /// Directory to serve.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Directory holding the `redirects` file.
    #[arg(long, default_value = "../site-src")]
    source: PathBuf,
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
    /// Redirect matching requests live instead of relying on generated pages.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,redirects=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let dev = if args.dev {
        let redirects = Redirects::load(&args.source)
            .with_context(|| format!("loading redirects from {}", args.source.display()))?;
        match redirects {
            Some(redirects) => {
                tracing::info!(rules = redirects.table.len(), "[redirect] Live redirects enabled");
                Some(DevRedirects::new(redirects))
            }
            None => None,
        }
    } else {
        None
    };

    let app = app(&args.root, dev);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
