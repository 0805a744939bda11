//! Cache Commands - 缓存管理

/// 清空缓存命令
#[derive(Debug, Clone, Default)]
pub struct ClearCache;
