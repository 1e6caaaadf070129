//! Built-in event handlers, subscribed when the session becomes ready.
//!
//! - `PRIVMSG`: turns prefixed chat text into a `COMMAND` event.
//! - `COMMAND`: owner-only shutdown; everything else goes to the
//!   [`CommandRegistry`].
//! - `KICK`: rejoins when the bot itself was kicked.
//! - `MODE`: accepted and ignored.

use crate::app::action::Context;
use crate::app::bus::{handler, EventBus, Handler, HandlerRef};
use crate::app::event::{Event, COMMAND_SIGNAL};
use crate::app::registry::CommandRegistry;
use crate::irc::commands::CommandInvocation;
use std::sync::Arc;

/// Command name that terminates the session when sent by an owner.
pub const SHUTDOWN_COMMAND: &str = "die";

/// Subscribe all built-in handlers to `bus`.
pub fn install(bus: &mut EventBus, registry: Arc<CommandRegistry>) {
    bus.subscribe("PRIVMSG", &privmsg());
    bus.subscribe(COMMAND_SIGNAL, &(Arc::new(CommandDispatcher::new(registry)) as HandlerRef));
    bus.subscribe("KICK", &kick());
    bus.subscribe("MODE", &mode());
}

pub fn privmsg() -> HandlerRef {
    handler(|ctx, event| {
        let Some(message) = event.message() else {
            return Ok(());
        };
        let prefix = ctx.config().command_prefix;
        if !message.text().starts_with(prefix) {
            return Ok(());
        }

        match CommandInvocation::from_privmsg(prefix, message) {
            Some(invocation) => {
                tracing::debug!(
                    command = %invocation.name,
                    sender = %invocation.sender,
                    "received command"
                );
                ctx.publish(COMMAND_SIGNAL, Event::Command(invocation));
            }
            None => tracing::debug!(text = message.text(), "ignoring malformed command"),
        }
        Ok(())
    })
}

/// Handles `COMMAND` events: the owner-only shutdown, then the registry.
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for CommandDispatcher {
    fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> anyhow::Result<()> {
        let Some(invocation) = event.command() else {
            return Ok(());
        };

        if invocation.name.eq_ignore_ascii_case(SHUTDOWN_COMMAND) {
            if ctx.config().is_owner(&invocation.sender) {
                tracing::info!(sender = %invocation.sender, "shutdown requested");
                ctx.shutdown(None);
            } else {
                tracing::warn!(sender = %invocation.sender, "refusing shutdown from non-owner");
            }
            return Ok(());
        }

        match self.registry.get(&invocation.name) {
            Some(command) => command.call(ctx, invocation),
            None => {
                tracing::debug!(command = %invocation.name, "no handler registered");
                Ok(())
            }
        }
    }
}

pub fn kick() -> HandlerRef {
    handler(|ctx, event| {
        let Some(message) = event.message() else {
            return Ok(());
        };
        let kicked = message
            .argument
            .as_deref()
            .and_then(|arg| arg.split_whitespace().next());

        if kicked.is_some_and(|nick| ctx.session().is_me(nick)) {
            tracing::info!(channel = %message.target, by = message.nick().unwrap_or(""), "kicked, rejoining");
            ctx.join(message.target.clone());
        }
        Ok(())
    })
}

pub fn mode() -> HandlerRef {
    // Channel and user modes are not tracked.
    handler(|_, _| Ok(()))
}
