//! Event bus: named signals fanning out to handlers.
//!
//! Signals are keyed by uppercased protocol verb (`PRIVMSG`, `KICK`, `376`)
//! plus the synthetic `COMMAND`. Each signal keeps its handlers in
//! subscription order, and a handler appears at most once per signal,
//! compared by `Arc` identity.
//!
//! Handlers run synchronously, inline on the read loop, so a slow handler
//! delays every line behind it. Keep them to a few milliseconds; anything
//! longer belongs on its own task.

use crate::app::action::Context;
use crate::app::event::Event;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> anyhow::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>, &Event) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> anyhow::Result<()> {
        self(ctx, event)
    }
}

pub type HandlerRef = Arc<dyn Handler>;

/// Wrap a closure as a [`HandlerRef`]. Keep the returned value around to
/// unsubscribe later.
pub fn handler<F>(f: F) -> HandlerRef
where
    F: Fn(&mut Context<'_>, &Event) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Outcome of one [`EventBus::publish`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub invoked: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct EventBus {
    signals: HashMap<String, Vec<HandlerRef>>,
}

fn signal_key(signal: &str) -> String {
    signal.to_ascii_uppercase()
}

fn same_handler(a: &HandlerRef, b: &HandlerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` to `signal`. Returns `false` if it was already there.
    pub fn subscribe(&mut self, signal: &str, handler: &HandlerRef) -> bool {
        let handlers = self.signals.entry(signal_key(signal)).or_default();
        if handlers.iter().any(|h| same_handler(h, handler)) {
            return false;
        }
        handlers.push(Arc::clone(handler));
        true
    }

    /// Remove `handler` from `signal`. Returns `false` if it was not there.
    pub fn unsubscribe(&mut self, signal: &str, handler: &HandlerRef) -> bool {
        let Some(handlers) = self.signals.get_mut(&signal_key(signal)) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|h| !same_handler(h, handler));
        before != handlers.len()
    }

    pub fn handler_count(&self, signal: &str) -> usize {
        self.signals.get(&signal_key(signal)).map_or(0, Vec::len)
    }

    /// Run every handler on `signal`, in order. A handler that errors or
    /// panics is logged and counted; the rest still run.
    pub fn publish(&self, signal: &str, ctx: &mut Context<'_>, event: &Event) -> PublishReport {
        let mut report = PublishReport::default();
        let Some(handlers) = self.signals.get(&signal_key(signal)) else {
            return report;
        };

        for handler in handlers {
            report.invoked += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(ctx, event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(signal, error = %format!("{:#}", e), "event handler failed");
                }
                Err(payload) => {
                    report.failed += 1;
                    tracing::warn!(
                        signal,
                        panic = panic_message(payload.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }
        report
    }
}
