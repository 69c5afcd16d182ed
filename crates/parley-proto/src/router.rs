//! Command dispatch.
//!
//! A [`Router`] maps command names to boxed [`Handler`]s over some context
//! type `C` (the server console and the client each bring their own context
//! and handler set). Parsing stays in [`crate::input`]; all side effects
//! happen inside handlers.

use crate::input::Command;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by dispatch. Both are local diagnostics, never faults:
/// the session state is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// No handler registered under this name.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// Wrong argument count or malformed argument; the payload is the
    /// usage string to show the user.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Result type for command handlers.
pub type RouteResult = Result<(), RouteError>;

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler<C: Send>: Send + Sync {
    /// Handle a dispatched command. `args` is the tokenized argument list;
    /// handlers requiring an exact arity return [`RouteError::Usage`] on a
    /// mismatch rather than indexing blindly.
    async fn handle(&self, ctx: &mut C, args: &[String]) -> RouteResult;
}

/// Registry of command handlers keyed by lowercased name.
pub struct Router<C: Send> {
    handlers: HashMap<&'static str, Box<dyn Handler<C>>>,
}

impl<C: Send> Router<C> {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under a command name.
    pub fn insert(&mut self, name: &'static str, handler: Box<dyn Handler<C>>) {
        self.handlers.insert(name, handler);
    }

    /// Command names registered with this router, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch a parsed command to its handler.
    pub async fn dispatch(&self, ctx: &mut C, cmd: &Command) -> RouteResult {
        match self.handlers.get(cmd.name.as_str()) {
            Some(handler) => handler.handle(ctx, &cmd.args).await,
            None => Err(RouteError::Unknown(cmd.name.clone())),
        }
    }
}

impl<C: Send> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}
