use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod app;
mod client;
mod config;
mod handler;
mod logging;
mod session;
mod tui;
mod ui;

use app::App;
use client::DocQaClient;
use config::Config;

#[derive(Parser)]
#[command(name = "docmind")]
#[command(about = "Chat with your documents: upload a PDF, get a summary, ask questions")]
struct Cli {
    /// Backend base URL (overrides DOCMIND_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF and print the generated summary
    Upload {
        /// Path to the PDF file
        file: PathBuf,
    },
    /// Ask a single question about the uploaded document
    Ask {
        /// Your question
        question: String,
    },
    /// Save a backend URL as the default
    SetUrl {
        /// Backend base URL, e.g. http://localhost:8000
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("warning: diagnostics disabled: {err:#}");
    }

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let api_url = config.resolve_api_url(cli.api_url.as_deref());

    match cli.command {
        None => run_tui(&api_url).await?,
        // One-shot commands print their own error and hint; exit nonzero
        // so scripts can detect the failure
        Some(Commands::Upload { file }) => {
            if upload_once(&api_url, &file).await.is_err() {
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { question }) => {
            if ask_once(&api_url, &question).await.is_err() {
                std::process::exit(1);
            }
        }
        Some(Commands::SetUrl { url }) => {
            Config::save_api_url(&url)?;
            println!("Backend URL set to {}", url.bold().cyan());
        }
    }

    Ok(())
}

async fn run_tui(api_url: &str) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(api_url);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }
    }

    tui::restore()?;
    Ok(())
}

async fn upload_once(api_url: &str, file: &std::path::Path) -> Result<()> {
    let client = DocQaClient::new(api_url);

    println!("📄 Uploading {}...", file.display().to_string().bold().cyan());

    match client.upload(file).await {
        Ok(summary) => {
            println!("\n{}", "Summary:".bold().green());
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("upload failed: {e:#}");
            println!("{}: {}", "Error uploading document".red(), e);
            println!(
                "Check that the backend is reachable at {} (override with --api-url or {})",
                api_url.bold(),
                config::API_URL_ENV.bold()
            );
            Err(e)
        }
    }
}

async fn ask_once(api_url: &str, question: &str) -> Result<()> {
    let client = DocQaClient::new(api_url);

    println!("🤖 Asking: {}\n", question.bold().cyan());

    match client.ask(question).await {
        Ok(answer) => {
            println!("{}", "Answer:".bold().green());
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("ask failed: {e:#}");
            println!("{}: {}", "Error asking question".red(), e);
            println!(
                "Upload a document first with {}, and check that the backend is reachable at {}",
                "docmind upload <FILE>".bold(),
                api_url.bold()
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn failed_upload_propagates_an_error() {
        let result = upload_once("http://127.0.0.1:1", Path::new("/no/such/report.pdf")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failed_ask_propagates_an_error() {
        // Port 1 refuses the connection without needing a backend
        let result = ask_once("http://127.0.0.1:1", "anything").await;
        assert!(result.is_err());
    }
}
