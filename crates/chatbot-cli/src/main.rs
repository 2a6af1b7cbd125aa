use std::path::PathBuf;

use anyhow::Result;
use chatbot_core::config::Settings;
use clap::Parser;

mod app;
mod commands;
mod theme;

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(about = "Chatbot - multi-conversation terminal chat client")]
#[command(version)]
struct Cli {
    /// Send a single prompt in a new conversation and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Directory holding saved conversations
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Send the whole conversation with each request
    #[arg(long)]
    history: bool,

    /// Color theme (dark, light, mono)
    #[arg(long, default_value = "dark")]
    theme: String,
}

fn init_tracing(settings: &Settings, interactive: bool) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    // The TUI owns the terminal, so interactive runs log to a file.
    if interactive {
        let data_dir = settings.data_dir();
        let log_file = std::fs::create_dir_all(&data_dir).and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(data_dir.join("chatbot.log"))
        });
        if let Ok(file) = log_file {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load();

    if let Some(ref model) = cli.model {
        settings.llm.model = model.clone();
    }
    if let Some(ref data_dir) = cli.data_dir {
        settings.storage.data_dir = Some(data_dir.clone());
    }
    if cli.history {
        settings.chat.include_history = true;
    }

    init_tracing(&settings, cli.prompt.is_none());

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&settings, &prompt).await?;
    } else {
        app::run_tui(settings, &cli.theme).await?;
    }

    Ok(())
}
