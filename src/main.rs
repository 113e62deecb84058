use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use url::Url;

use syndicate::config::FeedConfig;
use syndicate::feed::{load_items, FeedRenderer};
use syndicate::util::write_atomic;

#[derive(Parser, Debug)]
#[command(name = "syndicate", about = "Render an RSS 2.0 feed from JSON content items")]
struct Args {
    /// Feed configuration (TOML). Missing file means defaults.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// JSON array of content items, in feed order
    #[arg(long, value_name = "FILE")]
    items: PathBuf,

    /// Channel link used when the config has no `url`
    #[arg(long, value_name = "URL")]
    base_url: Option<Url>,

    /// Write the feed here instead of stdout (replaced atomically)
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the feed
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = FeedConfig::load(&args.config).with_context(|| {
        format!(
            "Failed to load feed config from '{}'",
            args.config.display()
        )
    })?;

    let items = load_items(&args.items)
        .await
        .with_context(|| format!("Failed to load items from '{}'", args.items.display()))?;

    if config.url().is_empty() && args.base_url.is_none() {
        tracing::warn!("No channel url configured and no --base-url given; <link> will be empty");
    }

    let fallback = args.base_url.as_ref().map(Url::as_str).unwrap_or("");
    let xml = FeedRenderer::new(&config)
        .fallback_url(fallback)
        .render(&items)
        .context("Failed to render feed")?;

    match &args.output {
        Some(path) => {
            write_atomic(path, xml.as_bytes())?;
            tracing::info!(path = %path.display(), bytes = xml.len(), "Wrote feed");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .context("Failed to write feed to stdout")?;
        }
    }

    Ok(())
}
