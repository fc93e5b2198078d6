use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{db_err, now, Service};
use crate::contract::model::{
    CleaningRecord, NewCleaningRecord, RecentPpu, RecordFilter, UploadedFile,
};
use crate::domain::error::DomainError;

/// Key prefix for registration photos.
pub const UPLOAD_PREFIX: &str = "cleaning";

impl Service {
    #[instrument(name = "cleaning_ops.service.list_records", skip(self, filter))]
    pub async fn list_records(
        &self,
        filter: RecordFilter,
    ) -> Result<Vec<CleaningRecord>, DomainError> {
        let rows = self
            .repo
            .list_records(&filter, self.config.list_limit)
            .await
            .map_err(db_err)?;
        debug!(count = rows.len(), "Listed registrations");
        Ok(rows)
    }

    #[instrument(name = "cleaning_ops.service.get_record", skip(self), fields(record_id = %id))]
    pub async fn get_record(&self, id: Uuid) -> Result<CleaningRecord, DomainError> {
        self.repo
            .find_record(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Registration", id))
    }

    #[instrument(name = "cleaning_ops.service.recent_ppu", skip(self), fields(user_id = %user_id))]
    pub async fn recent_ppu(&self, user_id: Uuid) -> Result<Vec<RecentPpu>, DomainError> {
        self.repo
            .recent_ppu(user_id, self.config.recent_ppu_limit)
            .await
            .map_err(db_err)
    }

    /// Upload the photos, then insert the row. Photos are removed again if the insert fails.
    #[instrument(
        name = "cleaning_ops.service.create_record",
        skip(self, input),
        fields(user_id = %input.user_id)
    )]
    pub async fn create_record(
        &self,
        input: NewCleaningRecord,
    ) -> Result<CleaningRecord, DomainError> {
        let ppu = input.ppu.trim().to_owned();
        let bus_number = input.bus_number.trim().to_owned();
        let mut missing = Vec::new();
        if ppu.is_empty() {
            missing.push("ppu".to_owned());
        }
        if bus_number.is_empty() {
            missing.push("busNumber".to_owned());
        }
        if !missing.is_empty() {
            return Err(DomainError::missing_fields("Missing required fields", missing));
        }

        let (front, back) = tokio::join!(
            self.upload(input.image_front.as_ref()),
            self.upload(input.image_back.as_ref())
        );
        let uploaded: Vec<String> = [&front, &back]
            .into_iter()
            .filter_map(|r| r.as_ref().ok().cloned().flatten())
            .collect();
        let (image_front_url, image_back_url) = match (front, back) {
            (Ok(f), Ok(b)) => (f, b),
            (Err(e), _) | (_, Err(e)) => {
                self.discard(&uploaded).await;
                return Err(e);
            }
        };

        let record = CleaningRecord {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            ppu,
            bus_number,
            terminal: input.terminal.as_str().to_owned(),
            cleaning_type: input.cleaning_type.as_str().to_owned(),
            stickers_removed: input.stickers_removed,
            graffiti_removed: input.graffiti_removed,
            image_front_url,
            image_back_url,
            created_at: now(),
        };

        if let Err(e) = self.repo.insert_record(record.clone()).await {
            self.discard(&uploaded).await;
            return Err(db_err(e));
        }

        info!(record_id = %record.id, photos = uploaded.len(), "Created registration");
        Ok(record)
    }

    async fn upload(&self, file: Option<&UploadedFile>) -> Result<Option<String>, DomainError> {
        let Some(file) = file else {
            return Ok(None);
        };
        let url = self
            .store
            .put(UPLOAD_PREFIX, file)
            .await
            .map_err(|e| DomainError::storage(format!("{e:#}")))?;
        debug!(backend = self.store.backend(), %url, "Stored photo");
        Ok(Some(url))
    }

    async fn discard(&self, urls: &[String]) {
        for url in urls {
            if let Err(e) = self.store.delete(url).await {
                warn!(%url, error = %e, "Failed to remove orphaned photo");
            }
        }
    }
}
