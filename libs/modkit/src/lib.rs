//! # ModKit - a small module system
//!
//! Modules declare what they can do by implementing capability traits
//! ([`Module`], [`DbModule`], [`RestfulModule`], [`RestHostModule`], [`StatefulModule`]).
//! The binary wires them into a [`ModuleRegistry`] and [`run`] drives every module
//! through the phases: init → db → rest → start → wait → stop.
//!
//! ## Example
//!
//! ```rust,ignore
//! let ops = Arc::new(CleaningOpsModule::default());
//! let registry = RegistryBuilder::default()
//!     .register(ModuleEntry::new("cleaning_ops", ops.clone()).with_db(ops.clone()).with_rest(ops))
//!     .build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod context;
pub mod contracts;
pub mod http;
pub mod registry;
pub mod runtime;

pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
pub use registry::{ModuleEntry, ModuleRegistry, RegistryBuilder, RegistryError};

pub use api::problem::{
    bad_request, internal_error, not_found, Problem, ProblemContext, ProblemResponse, ValidationError,
    APPLICATION_PROBLEM_JSON,
};
pub use http::client::TracedClient;

pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
