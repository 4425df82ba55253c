//! 用户业务服务

use std::sync::Arc;
use tracing::info;

use super::model::{NewUser, UserRecord};
use super::repository::UserRepository;
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn add_user(&self, user: &NewUser) -> Result<(), CoreError> {
        self.repository.insert(user).await?;
        info!("Created user: {} <{}>", user.name, user.email);
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, CoreError> {
        self.repository.list().await
    }

    pub async fn check_database(&self) -> Result<(), CoreError> {
        self.repository.ping().await
    }
}
