//! 核心层：错误处理、中间件、请求提取器

pub mod error;
pub mod extract;
pub mod middleware;
