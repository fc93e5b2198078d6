use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::domain::error::DomainError;
use crate::domain::ports::ObjectStore;
use crate::domain::repo::CleaningRepository;

mod breaks;
mod dashboard;
mod inspections;
mod records;
mod tasks;
mod users;

pub use dashboard::{month_start, today_start, week_start};
pub use records::UPLOAD_PREFIX;

/// Domain service for cleaning operations.
/// Depends only on the repository and object store ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn CleaningRepository>,
    store: Arc<dyn ObjectStore>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Row cap for record and task lists.
    pub list_limit: u64,
    pub recent_ppu_limit: u64,
    pub top_cleaners_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            list_limit: 200,
            recent_ppu_limit: 8,
            top_cleaners_limit: 5,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn CleaningRepository>,
        store: Arc<dyn ObjectStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

/// Current time at the precision every supported database keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Trimmed value, `None` when absent or blank.
pub(crate) fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}
