//! 用户存储

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use super::model::{NewUser, UserRecord};
use crate::core::error::CoreError;
use crate::infrastructure::database::{DatabaseManager, SqlParam};

const INSERT_USER_SQL: &str = "INSERT INTO users (name, email, age) VALUES (?, ?, ?)";
const SELECT_USERS_SQL: &str = "SELECT * FROM users";

/// 用户存储接口
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 插入一行
    async fn insert(&self, user: &NewUser) -> Result<(), CoreError>;

    /// 返回表中所有行，不保证顺序
    async fn list(&self) -> Result<Vec<UserRecord>, CoreError>;

    async fn ping(&self) -> Result<(), CoreError>;
}

/// 基于 MySQL 连接池的实现
pub struct MySqlUserRepository {
    db: DatabaseManager,
}

impl MySqlUserRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<(), CoreError> {
        let params = [
            SqlParam::from(user.name.as_str()),
            SqlParam::from(user.email.as_str()),
            SqlParam::from(&user.age),
        ];
        self.db.execute_write(INSERT_USER_SQL, &params).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, CoreError> {
        Ok(self.db.execute_read(SELECT_USERS_SQL, &[]).await?)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(self.db.ping().await?)
    }
}

#[derive(Default)]
struct MemoryTable {
    next_id: u64,
    rows: Vec<UserRecord>,
}

/// 进程内存中的实现，id 自增
#[derive(Default)]
pub struct MemoryUserRepository {
    table: Mutex<MemoryTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTable>, CoreError> {
        self.table
            .lock()
            .map_err(|_| CoreError::InternalServerError("user table lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<(), CoreError> {
        let mut table = self.lock()?;
        table.next_id += 1;

        let mut row = UserRecord::new();
        row.insert("id".to_string(), Value::from(table.next_id));
        row.insert("name".to_string(), Value::from(user.name.clone()));
        row.insert("email".to_string(), Value::from(user.email.clone()));
        row.insert("age".to_string(), Value::Number(user.age.clone()));
        table.rows.push(row);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, CoreError> {
        Ok(self.lock()?.rows.clone())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.lock().map(|_| ())
    }
}
