use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docvars::{config::Config, tui};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// PDF to pre-select; skips the file picker.
    pdf_file: Option<PathBuf>,

    /// Analyze endpoint, overriding DOCVARS_ANALYZE_URL.
    #[arg(long)]
    analyze_url: Option<String>,

    /// Refine endpoint, overriding DOCVARS_REFINE_URL.
    #[arg(long)]
    refine_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration; CLI flags win over the environment.
    let mut config = Config::from_env()?;
    if let Some(url) = args.analyze_url {
        config.api.analyze_url = url;
    }
    if let Some(url) = args.refine_url {
        config.api.refine_url = url;
    }

    // The TUI owns stdout, so tracing goes to a file. The guard must
    // outlive the app or buffered lines are lost.
    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "docvars.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docvars=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    info!(
        "Starting docvars (analyze: {}, refine: {})",
        config.api.analyze_url, config.api.refine_url
    );

    tui::run(config, args.pdf_file).await
}
