use tracing::{info, instrument};
use uuid::Uuid;

use super::{db_err, non_blank, now, Service};
use crate::contract::model::{NewTask, Task, TaskFilter, TaskStatus};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(
        name = "cleaning_ops.service.create_task",
        skip(self, input),
        fields(cleaner_id = %input.cleaner_id)
    )]
    pub async fn create_task(&self, input: NewTask) -> Result<Task, DomainError> {
        let Some(content) = non_blank(Some(&input.content)) else {
            return Err(DomainError::missing_fields(
                "cleanerId, supervisorId and content are required",
                vec!["content".to_owned()],
            ));
        };

        let task = Task {
            id: Uuid::new_v4(),
            cleaner_id: input.cleaner_id,
            supervisor_id: input.supervisor_id,
            title: non_blank(input.title.as_deref()).map(str::to_owned),
            content: content.to_owned(),
            status: TaskStatus::Pending,
            created_at: now(),
            completed_at: None,
        };
        self.repo.insert_task(task.clone()).await.map_err(db_err)?;
        info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    #[instrument(name = "cleaning_ops.service.list_tasks", skip(self, filter))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, DomainError> {
        self.repo
            .list_tasks(&filter, self.config.list_limit)
            .await
            .map_err(db_err)
    }

    /// One-way `pending -> done`. Completing twice refreshes `completed_at`.
    #[instrument(name = "cleaning_ops.service.complete_task", skip(self), fields(task_id = %id))]
    pub async fn complete_task(&self, id: Uuid) -> Result<Task, DomainError> {
        let task = self
            .repo
            .complete_task(id, now())
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Task", id))?;
        info!("Task completed");
        Ok(task)
    }
}
