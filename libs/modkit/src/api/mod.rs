//! HTTP API building blocks shared by REST modules.

pub mod problem;
