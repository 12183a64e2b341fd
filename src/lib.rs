//! chatbox is a full-screen terminal chat assistant for OpenAI-compatible
//! completion APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the chat session controller and the
//!   completion client.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the request and response payloads of the completion API.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings and dispatches into
//! [`ui::chat_loop`] for interactive sessions or [`cli::say`] for one-shot use.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
