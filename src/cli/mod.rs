//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, resolves session settings and
//! runs either the interactive chat or a one-shot `say`.

pub mod say;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::say::run_say;
use crate::core::config::{Config, SessionSettings, SettingOverrides};
use crate::ui::chat_loop::run_chat;
use crate::ui::theme::ThemeMode;
use crate::utils::logging::{init_tracing, TraceTarget};

#[derive(Parser, Debug)]
#[command(name = "chatbox")]
#[command(version)]
#[command(about = "A full-screen terminal chat assistant backed by the OpenAI API")]
#[command(
    long_about = "chatbox is a full-screen terminal chat assistant. Each message you send is \
forwarded to an OpenAI-compatible chat completion endpoint and the reply is shown \
in the conversation.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Your OpenAI API key (required to get replies)\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  RUST_LOG          Diagnostic filter (defaults to chatbox=info)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Shift+Enter       Insert a newline (Alt+Enter also works)\n\
  Ctrl+T            Switch between light and dark themes\n\
  PageUp/PageDown   Scroll the conversation by a page\n\
  Shift+Up/Down     Scroll the conversation by a line\n\
  Ctrl+C            Quit (Ctrl+D also quits when the input is empty)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model identifier for this session
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Completion API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Initial theme
    #[arg(short = 't', long, global = true, value_name = "light|dark")]
    pub theme: Option<ThemeMode>,

    /// Alternate config file
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write diagnostics to a file
    #[arg(long, global = true, value_name = "PATH")]
    pub trace_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive chat interface (default)
    Chat,
    /// Send a single message and print the reply (no TUI)
    Say {
        /// Message to send; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
}

impl Args {
    pub fn overrides(&self) -> SettingOverrides {
        SettingOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            theme: self.theme,
        }
    }

    pub fn load_config(&self) -> Result<Config, Box<dyn Error>> {
        let config = match &self.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };
        Ok(config)
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.clone().unwrap_or(Commands::Chat);
    let interactive = matches!(command, Commands::Chat);

    init_tracing(&TraceTarget::select(args.trace_file.as_deref(), interactive))?;

    let config = args.load_config()?;
    let settings = SessionSettings::from_environment(&config, &args.overrides());

    match command {
        Commands::Chat => run_chat(settings).await,
        Commands::Say { prompt } => run_say(prompt, settings).await,
    }
}
