//! `ledgerbot-auth` — caller identity and the role gate for privileged commands.
//!
//! This crate is intentionally decoupled from the chat platform and storage.

pub mod authorize;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, authorize, has_required_role};
pub use principal::{Principal, UserRef};
pub use roles::Role;
