use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{db_err, now, Service};
use crate::contract::model::{Role, User, UserUpsert};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(name = "cleaning_ops.service.list_users", skip(self))]
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        let users = self.repo.list_users(role).await.map_err(db_err)?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Create-or-fetch by case-insensitive name. The returned flag is true when a row was inserted.
    #[instrument(name = "cleaning_ops.service.create_user", skip(self))]
    pub async fn create_user(&self, name: &str, role: Role) -> Result<UserUpsert, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::missing_fields(
                "name and role are required",
                vec!["name".to_owned()],
            ));
        }

        let candidate = User {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            role,
            created_at: now(),
        };
        let res = self
            .repo
            .insert_or_get_user(candidate)
            .await
            .map_err(db_err)?;
        if res.created {
            info!(user_id = %res.user.id, "Created user");
        } else {
            debug!(user_id = %res.user.id, "User already exists");
        }
        Ok(res)
    }
}
