// 缓存模块
// 包含缓存接口、Redis 实现、缓存键、缓存数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;

pub use operations::recipe::RecipeCacheOperations;
pub use operations::session::SessionCacheOperations;
pub use operations::token::TokenCacheOperations;
pub use redis_cache::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache entry could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 键值缓存。单键操作需为原子操作
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
