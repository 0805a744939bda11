//! Health Queries

/// 服务健康检查
#[derive(Debug, Clone, Default)]
pub struct GetHealth;
