//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal lifecycle, key handling and the event loop that
//!   feeds [`crate::core::app`] with actions.
//! - [`renderer`]: draws one frame from the session state.
//! - [`theme`] and [`builtin_themes`]: the light and dark palettes.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the conversation and the network calls.

pub mod builtin_themes;
pub mod chat_loop;
pub mod renderer;
pub mod theme;
