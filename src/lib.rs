//! A minimal IRC bot.
//!
//! The [`irc`] layer frames, parses and sends protocol lines over TCP. The
//! [`app`] layer drives one session through registration to a joined
//! channel and dispatches inbound traffic over an event bus. Bot commands
//! (`!name args...`) are routed to a [`CommandRegistry`].

pub mod app;
pub mod config;
pub mod error;
pub mod irc;
pub mod logging;

pub use app::controller::SessionController;
pub use app::registry::CommandRegistry;
pub use config::BotConfig;
