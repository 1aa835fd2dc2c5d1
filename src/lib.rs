//! Atlas Chat is a terminal-first client for the Atlas agent platform.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the chat transcript, the tool-mention
//!   encoder/decoder, tool classification, and the optimistic Composio
//!   connection store.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop, including the mention-aware composer and its suggestion popup.
//! - [`api`] is the HTTP client for the Atlas backend: agent replies, tool
//!   listings, and connection management.
//! - [`cli`] parses command-line arguments and dispatches one-shot commands
//!   (tool/connection listings, connect/disconnect) or the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
