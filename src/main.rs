use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trushna::voice::{ConsoleSpeaker, StdinCapture};
use trushna::{Config, Daemon, HttpResponder, JsonFileStore, SystemLauncher, intent};

/// Trushna - voice and text personal assistant
#[derive(Parser)]
#[command(name = "trushna", version, about)]
struct Cli {
    /// Wake word override (e.g., "hey trushna"); pass "" to disable
    #[arg(short, long, env = "TRUSHNA_WAKE_WORD")]
    wake_word: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an utterance and print the result
    Parse {
        /// Utterance to classify
        text: String,
    },
    /// List scheduled reminders
    Reminders,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,trushna=info",
        1 => "info,trushna=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if let Some(wake) = cli.wake_word {
        let wake = wake.trim().to_lowercase();
        config.wake_word = if wake.is_empty() { None } else { Some(wake) };
    }

    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Parse { text } => cmd_parse(&text),
            Command::Reminders => cmd_reminders(&config),
        };
    }

    tracing::info!(
        wake_word = ?config.wake_word,
        data_dir = %config.data_dir.display(),
        "starting assistant"
    );

    let (engine, capture_rx) = StdinCapture::with_receiver();
    let speaker = Arc::new(ConsoleSpeaker);
    let launcher = Arc::new(SystemLauncher);
    let store = Arc::new(JsonFileStore::in_dir(&config.data_dir));

    let responder: Option<Arc<dyn trushna::GenerativeResponder>> = config
        .generative_url
        .as_deref()
        .map(|url| Arc::new(HttpResponder::new(url)) as _);
    if responder.is_none() {
        tracing::info!("no generative endpoint configured, unknown commands get a fixed reply");
    }

    if let Some(ww) = &config.wake_word {
        tracing::info!("assistant ready - say \"{ww}\" (or type a command)");
    } else {
        tracing::info!("assistant ready - every line is a command");
    }

    let daemon = Daemon::new(
        config,
        Box::new(engine),
        capture_rx,
        speaker,
        launcher,
        responder,
        store,
    )?;

    // Run until interrupted
    daemon.run().await?;

    Ok(())
}

/// Classify an utterance and print the result
fn cmd_parse(text: &str) -> anyhow::Result<()> {
    let parsed = intent::parse(text);
    println!("{}: {:?}", parsed.intent.kind(), parsed.intent);
    Ok(())
}

/// List scheduled reminders from the persisted snapshot
fn cmd_reminders(config: &Config) -> anyhow::Result<()> {
    use trushna::Store;

    let store = JsonFileStore::in_dir(&config.data_dir);
    let snapshot = store.load()?;

    if snapshot.reminders.is_empty() {
        println!("No reminders scheduled");
        return Ok(());
    }

    for reminder in snapshot.reminders.iter() {
        let due = chrono::DateTime::from_timestamp_millis(reminder.due_at_ms)
            .map_or_else(|| "?".to_string(), |t| t.with_timezone(&chrono::Local).to_rfc3339());
        let status = if reminder.fired { "fired" } else { "pending" };
        println!("[{status}] {due}  {}", reminder.task);
    }

    Ok(())
}
