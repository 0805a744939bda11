//! Cache Queries - 缓存查询

/// recent 默认条数
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// recent 最大条数
pub const MAX_RECENT_LIMIT: usize = 200;

/// 缓存统计查询
#[derive(Debug, Clone, Default)]
pub struct GetCacheStats;

/// 最近活跃条目查询
#[derive(Debug, Clone)]
pub struct ListRecentCache {
    pub limit: Option<i64>,
}

impl ListRecentCache {
    /// 钳制到 [1, 200]，缺省 50
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(limit) => limit.clamp(1, MAX_RECENT_LIMIT as i64) as usize,
            None => DEFAULT_RECENT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_limit_clamp() {
        assert_eq!(ListRecentCache { limit: None }.effective_limit(), 50);
        assert_eq!(ListRecentCache { limit: Some(0) }.effective_limit(), 1);
        assert_eq!(ListRecentCache { limit: Some(-4) }.effective_limit(), 1);
        assert_eq!(ListRecentCache { limit: Some(500) }.effective_limit(), 200);
        assert_eq!(ListRecentCache { limit: Some(20) }.effective_limit(), 20);
    }
}
