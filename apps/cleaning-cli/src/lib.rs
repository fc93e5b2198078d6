//! Terminal client for the cleaning operations API.
//!
//! A locally cached identity gates every command; the cached role decides
//! whether the cleaner or the supervisor command set applies.

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod identity;
pub mod model;

pub use cli::{Cli, Command};
pub use client::ApiClient;
pub use commands::App;
pub use error::ClientError;
pub use identity::{Identity, IdentityStore};
