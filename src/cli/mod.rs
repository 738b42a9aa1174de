pub mod commands;

use chrono::Utc;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::cli::commands::Commands;
use crate::config::AppConfig;
use crate::llm::{models::mime_for_extension, ProviderFactory, VisionProvider};
use crate::page::{PageController, PageError, PageInput, UploadedImage};
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown LLM provider '{0}'")]
    UnknownProvider(String),
    #[error("Failed to read {}: {source}", .path.display())]
    ReadImage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Page(#[from] PageError),
    #[error("Serve is handled by the HTTP server entry point")]
    NotACliCommand,
}

pub async fn run_cli(command: Commands, config: AppConfig) -> Result<(), CliError> {
    let provider = ProviderFactory::create_default(&config)
        .ok_or_else(|| CliError::UnknownProvider(config.llm.provider.clone()))?;

    match command {
        Commands::Serve => Err(CliError::NotACliCommand),
        Commands::Ask { image, question } => {
            let upload = read_image_at(&image)?;

            let controller = PageController::from_config(provider, &config);
            let store = SessionStore::new();
            let outcome = controller
                .run_cycle(&store, Uuid::new_v4(), PageInput::submit(Some(upload), question), Utc::now())
                .await;

            if let Some(e) = outcome.error {
                return Err(e.into());
            }
            print_exchange(
                outcome.view.last_question.as_deref().unwrap_or_default(),
                outcome.view.last_response.as_deref().unwrap_or_default(),
            );
            Ok(())
        }
        Commands::Chat { image } => run_repl(&image, provider, &config).await,
    }
}

fn read_image_at(path: &Path) -> Result<UploadedImage, CliError> {
    read_image(path).map_err(|source| CliError::ReadImage {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads an image from disk the way the uploader would hand it over.
pub fn read_image(path: &Path) -> io::Result<UploadedImage> {
    let data = std::fs::read(path)?;
    let mime_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .unwrap_or("application/octet-stream");

    Ok(UploadedImage {
        mime_type: mime_type.to_string(),
        data,
    })
}

fn print_exchange(question: &str, answer: &str) {
    println!("USER: {}", question);
    println!("JARVIS: {}", answer);
}

async fn run_repl(
    image: &Path,
    provider: Arc<dyn VisionProvider>,
    config: &AppConfig,
) -> Result<(), CliError> {
    let mut upload = read_image_at(image)?;

    let controller = PageController::from_config(provider, config);
    let store = SessionStore::new();
    let session_id = Uuid::new_v4();

    println!("--- Conversational AI Image Chatbot ---");
    println!("Image: {}", image.display());
    println!("Commands: /image <path>, /history, /exit");
    println!("---------------------------------------");

    loop {
        print!("\nUSER> ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        }
        let text = input.trim();

        if text == "/exit" || text == "/quit" {
            break;
        }
        if let Some(path) = text.strip_prefix("/image ") {
            match read_image(Path::new(path.trim())) {
                Ok(next) => {
                    upload = next;
                    println!("Image switched to {}", path.trim());
                }
                Err(e) => eprintln!("Failed to read {}: {}", path.trim(), e),
            }
            continue;
        }
        if text == "/history" {
            let outcome = controller
                .run_cycle(&store, session_id, PageInput::render(), Utc::now())
                .await;
            if outcome.view.chat_history.is_empty() {
                println!("No history yet.");
            }
            for pair in &outcome.view.chat_history {
                print_exchange(pair.user(), pair.ai());
            }
            continue;
        }

        let outcome = controller
            .run_cycle(
                &store,
                session_id,
                PageInput::submit(Some(upload.clone()), text),
                Utc::now(),
            )
            .await;

        match outcome.error {
            Some(e) => eprintln!("Error: {}", e),
            None => println!("JARVIS> {}", outcome.view.last_response.unwrap_or_default()),
        }
    }

    Ok(())
}
