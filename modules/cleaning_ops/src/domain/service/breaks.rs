use tracing::{info, instrument};
use uuid::Uuid;

use super::{db_err, non_blank, now, Service};
use crate::contract::model::{BreakAssignment, BreakAssignmentView};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(name = "cleaning_ops.service.get_break", skip(self), fields(user_id = %user_id))]
    pub async fn get_break(&self, user_id: Uuid) -> Result<Option<BreakAssignment>, DomainError> {
        self.repo.find_break(user_id).await.map_err(db_err)
    }

    #[instrument(name = "cleaning_ops.service.list_breaks", skip(self))]
    pub async fn list_breaks(&self) -> Result<Vec<BreakAssignmentView>, DomainError> {
        self.repo.list_breaks().await.map_err(db_err)
    }

    /// Last write wins; a blank time clears the assignment's value but keeps the row.
    #[instrument(name = "cleaning_ops.service.set_break", skip(self), fields(user_id = %user_id))]
    pub async fn set_break(
        &self,
        user_id: Uuid,
        break_time: Option<&str>,
    ) -> Result<BreakAssignment, DomainError> {
        let saved = self
            .repo
            .upsert_break(BreakAssignment {
                user_id,
                break_time: non_blank(break_time).map(str::to_owned),
                updated_at: now(),
            })
            .await
            .map_err(db_err)?;
        info!(break_time = ?saved.break_time, "Break assignment saved");
        Ok(saved)
    }
}
