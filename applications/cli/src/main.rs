/// Sonora - interactive command-line music player
use clap::Parser;
use sonora_cli::{AppConfig, BackendKind, SonoraApp};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sonora", version)]
#[command(about = "Sonora - Cross-platform Music Player", long_about = None)]
struct Cli {
    /// Path to music library (default: ./music)
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scan library for audio files at startup
    #[arg(short, long)]
    scan: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Rendering backend used to open tracks
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "sonora=debug"
    } else {
        "sonora=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.library,
        cli.backend,
        cli.scan,
    );

    let app = SonoraApp::new(&config)?;
    app.attach_console();

    // Not locked for the session: the console observer prints from playback threads
    let mut out = io::stdout();

    if config.library.scan_on_start {
        if let Err(e) = app.scan_library(&mut out) {
            tracing::warn!("Library scan failed: {}", e);
        }
    }

    let stdin = io::stdin();
    app.run(&mut stdin.lock(), &mut out)?;

    tracing::info!("Goodbye");
    Ok(())
}
