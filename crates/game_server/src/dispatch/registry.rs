//! Handler registry mapping each command kind to its handler.

use super::CommandHandler;
use crate::error::ServerError;
use outpost_protocol::CommandKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup table from command kind to the handler responsible for it.
///
/// Built once at startup and read-only afterwards, so dispatch lookups need
/// no synchronization. Registering two handlers for the same kind is a
/// startup-time configuration error, never a silent overwrite.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for one command kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - The command kind this handler owns
    /// * `handler` - The handler invoked for every message of that kind
    ///
    /// # Returns
    ///
    /// `Ok(())` on first registration, or `ServerError::Configuration` if the
    /// kind already has a handler.
    pub fn register(
        &mut self,
        kind: CommandKind,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), ServerError> {
        if self.handlers.contains_key(&kind) {
            return Err(ServerError::Configuration(format!(
                "duplicate handler registration for kind `{kind}`"
            )));
        }
        self.handlers.insert(kind, handler);
        Ok(())
    }

    /// Looks up the handler for a kind.
    pub fn lookup(&self, kind: CommandKind) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(&kind)
    }

    /// Kinds that currently have no registered handler.
    ///
    /// Useful as a startup assertion: a fully configured server covers every
    /// kind in [`CommandKind::ALL`].
    pub fn missing_kinds(&self) -> Vec<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .filter(|kind| !self.handlers.contains_key(kind))
            .collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
