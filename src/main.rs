mod config;
mod driver;
mod error;
mod export;
mod extract;
mod net;
mod paginate;
mod records;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use crate::driver::Selection;
use crate::net::HttpSession;

#[derive(Parser)]
#[command(
    name = "okc_backup",
    about = "Back up profile questions, messages and likes to one XML document"
)]
struct Cli {
    /// Extract answered questions
    #[arg(long)]
    questions: bool,
    /// Extract message threads
    #[arg(long)]
    messages: bool,
    /// Extract likes
    #[arg(long)]
    likes: bool,
    /// Write the export document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Credentials file (default: okc-backup.toml in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let selection = if cli.questions || cli.messages || cli.likes {
        Selection {
            questions: cli.questions,
            messages: cli.messages,
            likes: cli.likes,
        }
    } else {
        Selection::all()
    };

    let creds = config::load(cli.config.as_deref())?;
    let session = HttpSession::new()?;
    let document = driver::run(&session, &creds, selection)?;

    // Serialize fully before touching the sink so a failed run never
    // leaves a partial document.
    let bytes = export::write_document(&document)?;
    match &cli.output {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(&bytes)
            .context("Failed to write export to stdout")?,
    }

    eprintln!(
        "Exported {} questions, {} messages, {} likes.",
        document.questions.len(),
        document.messages.len(),
        document.likes.len()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
