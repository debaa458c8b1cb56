//! Chat front end: command handlers, dispatch, and the Discord gateway.

pub mod app;
pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod gateway;
pub mod messages;
pub mod reply;

pub use context::{CommandOptions, Invocation, OptionValue};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use reply::{Reply, Responder, Visibility};
