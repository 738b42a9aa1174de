use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jarvis", version, about = "Conversational AI image chatbot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web page and its HTTP API
    Serve,

    /// Ask a single question about an image and print the answer
    Ask {
        /// Path to a JPEG or PNG image
        #[arg(short, long)]
        image: PathBuf,
        /// The question to ask about the image
        #[arg(short, long, default_value = "")]
        question: String,
    },

    /// Chat about an image from the terminal
    Chat {
        /// Path to a JPEG or PNG image
        #[arg(short, long)]
        image: PathBuf,
    },
}
