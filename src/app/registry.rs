//! Extension point for bot commands.
//!
//! The built-in `COMMAND` handler looks every non-builtin command up here.
//! A command handler receives the invocation and may queue outbound lines
//! through its [`Context`]; it returns nothing else.

use crate::app::action::Context;
use crate::irc::commands::CommandInvocation;
use std::collections::HashMap;
use std::sync::Arc;

pub trait CommandHandler: Send + Sync {
    fn call(&self, ctx: &mut Context<'_>, invocation: &CommandInvocation) -> anyhow::Result<()>;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut Context<'_>, &CommandInvocation) -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self, ctx: &mut Context<'_>, invocation: &CommandInvocation) -> anyhow::Result<()> {
        self(ctx, invocation)
    }
}

/// Command name to handler map. Names are case-insensitive.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, returning whatever it replaced.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Option<Arc<dyn CommandHandler>> {
        self.commands.insert(name.to_lowercase(), handler)
    }

    pub fn register_fn<F>(&mut self, name: &str, f: F) -> Option<Arc<dyn CommandHandler>>
    where
        F: Fn(&mut Context<'_>, &CommandInvocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(f))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.commands.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
