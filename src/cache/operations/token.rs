use std::time::Duration;

use crate::cache::keys::revoked_session_key;
use crate::cache::models::token::RevokedSession;
use crate::cache::{Cache, CacheError};

/// 令牌吊销列表操作
pub struct TokenCacheOperations;

impl TokenCacheOperations {
    /// 吊销令牌族。记录保留到该族中最长寿的令牌过期为止
    pub async fn revoke_session(
        cache: &dyn Cache,
        session_id: &str,
        user_id: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let record = RevokedSession {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            revoked_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_vec(&record)?;
        cache.set(&revoked_session_key(session_id), json, ttl).await
    }

    pub async fn is_revoked(cache: &dyn Cache, session_id: &str) -> Result<bool, CacheError> {
        Ok(cache.get(&revoked_session_key(session_id)).await?.is_some())
    }
}
