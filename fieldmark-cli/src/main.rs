//! # Fieldmark
//!
//! Replays a scripted viewer session headlessly.

use anyhow::Context;
use clap::Parser;
use fieldmark_cli::CliArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fieldmark_core=debug,fieldmark_cli=debug"));

    // stdout carries the output document
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::info!(script = %args.script.display(), format = ?args.format, "Starting Fieldmark");

    let output = fieldmark_cli::run(&args).await?;
    match &args.output {
        Some(path) => tokio::fs::write(path, output)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}
