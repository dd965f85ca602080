use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod app;
mod client;
mod config;
mod handler;
mod logging;
mod state;
mod tui;
mod ui;

use app::App;
use client::TranscriptClient;
use config::Config;

#[derive(Parser)]
#[command(name = "meeting-mind", version)]
#[command(about = "Upload meeting transcripts and chat with them")]
struct Cli {
    /// Backend base URL (defaults to the config file, then http://localhost:8000)
    #[arg(short, long, env = "MEETING_MIND_SERVER", global = true)]
    server: Option<String>,

    /// Directory for log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one transcript file and print the server's reply
    Upload {
        /// Transcript file to send
        file: PathBuf,
    },
    /// Ask one question about the uploaded transcripts
    Ask {
        /// Your question
        question: String,
    },
    /// Save the backend URL to the config file
    SetServer {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring config: {e:#}");
        Config::new()
    });

    let log_dir = cli.log_dir.as_deref().or(config.log_dir.as_deref());
    if let Err(e) = logging::init_logging(log_dir) {
        eprintln!("Logging disabled: {e:#}");
    }

    let server_url = config.resolve_server_url(cli.server.as_deref());
    tracing::info!(%server_url, "starting");
    let client = TranscriptClient::new(&server_url);

    match cli.command {
        None => {
            run_tui(client).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Upload { file }) => Ok(upload_once(&client, file).await),
        Some(Commands::Ask { question }) => Ok(ask_once(&client, &question).await),
        Some(Commands::SetServer { url }) => {
            let path = Config::get_config_path()?;
            let updated = Config {
                server_url: Some(url),
                ..config
            };
            updated
                .save_to(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved server URL to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(client: TranscriptClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init().context("failed to initialise terminal")?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await,
                None => break,
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    if app.is_busy() {
        tracing::warn!("exiting with requests still in flight");
    }
    tracing::info!("exiting");
    result
}

/// Non-interactive upload, printing the same text the Upload screen shows
async fn upload_once(client: &TranscriptClient, file: PathBuf) -> ExitCode {
    let mut upload = state::UploadState::default();
    upload.select_file(file);
    let Some(path) = upload.begin_submit() else {
        return ExitCode::FAILURE;
    };

    let outcome = client.upload(&path).await;
    let failed = outcome.is_err();
    upload.finish_submit(outcome);

    if failed {
        eprintln!("{}", upload.status);
        ExitCode::FAILURE
    } else {
        println!("{}", upload.status);
        ExitCode::SUCCESS
    }
}

/// Non-interactive question, printing the bot's reply
async fn ask_once(client: &TranscriptClient, question: &str) -> ExitCode {
    let mut chat = state::ChatState::default();
    chat.set_draft(question);
    let Some(question) = chat.begin_send() else {
        eprintln!("Nothing to ask");
        return ExitCode::FAILURE;
    };

    let outcome = client.chat(&question).await;
    let failed = outcome.is_err();
    chat.finish_send(outcome);

    let reply = chat.messages.last().map(|m| m.text.as_str()).unwrap_or_default();
    if failed {
        eprintln!("{reply}");
        ExitCode::FAILURE
    } else {
        println!("{reply}");
        ExitCode::SUCCESS
    }
}
