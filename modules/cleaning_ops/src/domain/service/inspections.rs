use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{db_err, non_blank, now, Service};
use crate::contract::model::{Inspection, InspectionFilter, InspectionView, NewInspection};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(
        name = "cleaning_ops.service.create_inspection",
        skip(self, input),
        fields(cleaning_id = %input.cleaning_id, passed = input.passed)
    )]
    pub async fn create_inspection(
        &self,
        input: NewInspection,
    ) -> Result<Inspection, DomainError> {
        let inspection = Inspection {
            id: Uuid::new_v4(),
            cleaning_id: input.cleaning_id,
            supervisor_id: input.supervisor_id,
            passed: input.passed,
            comments: non_blank(input.comments.as_deref()).map(str::to_owned),
            created_at: now(),
        };
        self.repo
            .insert_inspection(inspection.clone())
            .await
            .map_err(db_err)?;
        info!(inspection_id = %inspection.id, "Created inspection");
        Ok(inspection)
    }

    #[instrument(name = "cleaning_ops.service.list_inspections", skip(self, filter))]
    pub async fn list_inspections(
        &self,
        filter: InspectionFilter,
    ) -> Result<Vec<InspectionView>, DomainError> {
        let rows = self.repo.list_inspections(&filter).await.map_err(db_err)?;
        debug!(count = rows.len(), "Listed inspections");
        Ok(rows)
    }
}
