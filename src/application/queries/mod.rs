//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod cache_queries;
mod health_queries;
mod voice_queries;

pub mod handlers;

pub use cache_queries::*;
pub use health_queries::*;
pub use voice_queries::*;
