//! lm-bridge: chat-completion adapter and endpoint validator for LM Studio
//!
//! The adapter turns role-tagged conversations into LM Studio's restricted
//! `user`/`assistant` wire format, performs one bounded call, and returns either
//! the answer (with any `<think>` block removed) or a categorized error. The
//! validator checks an endpoint for a named provider and reports a verdict.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod messages;
pub mod server;
pub mod services;
pub mod store;
pub mod validator;

// Re-exports for convenience
pub use error::{BridgeError, Result};
pub use services::{ChatAdapter, CompletionErrorKind, CompletionResult};
pub use validator::{EndpointValidator, Verdict};
