//! Core bot logic: session state, event dispatch and the built-in handlers.

pub mod action;
pub mod bus;
pub mod controller;
pub mod event;
pub mod handler;
pub mod registry;
pub mod state;
