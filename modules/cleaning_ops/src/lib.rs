//! Cleaning operations module: users, cleaning registrations, inspections,
//! supervisor tasks, break assignments and the dashboard aggregates.
//!
//! Layout follows the usual module shape:
//! - `contract`: plain domain models shared by the layers
//! - `domain`: service, repository ports and the object store port
//! - `infra`: SeaORM storage and upload backends (local disk or S3)
//! - `api::rest`: DTOs, handlers and routes

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use module::CleaningOpsModule;
