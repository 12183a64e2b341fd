//! Session state and the completion service it talks to.
//!
//! - [`app`]: the chat session controller and its action reducer.
//! - [`transcript`] and [`message`]: conversation history.
//! - [`completion`]: the HTTP completion client and its error taxonomy.
//! - [`config`]: read-only settings from CLI, environment and `config.toml`.

pub mod app;
pub mod completion;
pub mod config;
pub mod constants;
pub mod message;
pub mod transcript;
