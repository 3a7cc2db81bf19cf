//! User ingestion for the storefront.
//!
//! A signup shifts the demographic and count aggregates, so it dirties the
//! dashboard views; no catalog or order view depends on users directly.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{CreateUserParams, UsersRepo, UsersWriteRepo};
use crate::cache::CacheTrigger;
use crate::domain::entities::UserRecord;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
    users_write: Arc<dyn UsersWriteRepo>,
    trigger: Arc<CacheTrigger>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        users_write: Arc<dyn UsersWriteRepo>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            users,
            users_write,
            trigger,
        }
    }

    pub async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, AppError> {
        if params.name.trim().is_empty() {
            return Err(AppError::validation("user name must not be empty"));
        }
        if params.email.trim().is_empty() {
            return Err(AppError::validation("user email must not be empty"));
        }

        let user = self.users_write.create_user(params).await?;
        self.trigger.admin_views_dirty().await;
        Ok(user)
    }

    pub async fn user(&self, id: Uuid) -> Result<UserRecord, AppError> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }
}
