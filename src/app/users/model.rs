//! 用户数据模型

use serde::{Deserialize, Serialize};
use serde_json::Number;
use validator::Validate;

use crate::core::error::CoreError;
use crate::infrastructure::database::Record;

/// `users` 表中的一行，包含表中全部列
pub type UserRecord = Record;

/// 新增用户请求
///
/// 字段只检查是否存在；长度、格式等约束交给表结构。
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(required(message = "name is required"))]
    pub name: Option<String>,

    #[validate(required(message = "email is required"))]
    pub email: Option<String>,

    /// 任意 JSON 数字，整数或小数
    #[validate(required(message = "age is required"))]
    pub age: Option<Number>,
}

/// 校验通过、字段齐全的新用户
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Number,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = CoreError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        match (req.name, req.email, req.age) {
            (Some(name), Some(email), Some(age)) => Ok(NewUser { name, email, age }),
            _ => Err(CoreError::BadRequest(
                "name, email and age are required".to_string(),
            )),
        }
    }
}

/// 写操作的确认消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn user_added() -> Self {
        Self {
            message: "User added successfully".to_string(),
        }
    }
}
