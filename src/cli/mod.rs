//! Command-line interface parsing and handling.
//!
//! The default command opens the chat loop; the one-shot subcommands
//! print tool/connection listings or manage Composio connections from a
//! regular shell.

pub mod connection_list;
pub mod tool_list;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::connection_list::{connect_app, disconnect_app, list_connections};
use crate::cli::tool_list::list_tools;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser)]
#[command(name = "atlas-chat")]
#[command(version = VERSION, about = "A terminal chat interface for Atlas agents")]
#[command(
    long_about = "Atlas Chat is a full-screen terminal chat interface for Atlas agents. \
Mention tools with @ to wire up integrations without leaving the composer: \
tools already on the agent complete into the message, account-level tools are \
added to the agent, and unconnected apps start a Composio connection.\n\n\
Environment Variables:\n\
  ATLAS_API_KEY     Your Atlas API key (overrides the config file)\n\
  ATLAS_BASE_URL    Custom API base URL (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  @                 Open the tool suggestion popup\n\
  Up/Down           Navigate suggestions (or scroll the transcript)\n\
  Tab/Enter         Confirm a suggestion\n\
  Enter             Send the message\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Agent to chat with (falls back to default_agent in the config)
    #[arg(short = 'a', long, global = true, value_name = "AGENT_ID")]
    pub agent: Option<String>,

    /// Append the conversation transcript to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List the tools available to an agent, with connection status
    Tools,
    /// List your Composio connections
    Connections,
    /// Connect a Composio app to your account
    Connect {
        /// App key, e.g. "gmail"
        app_key: String,
    },
    /// Disconnect a Composio app from your account
    Disconnect {
        /// App key, e.g. "gmail"
        app_key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_tracing()?;
    let args = Args::parse();
    let config = Config::load()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(config, args.agent, args.log).await,
        Commands::Tools => list_tools(&config, args.agent).await,
        Commands::Connections => list_connections(&config).await,
        Commands::Connect { app_key } => connect_app(&config, &app_key).await,
        Commands::Disconnect { app_key } => disconnect_app(&config, &app_key).await,
    }
}
