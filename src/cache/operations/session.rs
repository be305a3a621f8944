use std::time::Duration;

use crate::cache::keys::session_key;
use crate::cache::models::session::CachedSession;
use crate::cache::{Cache, CacheError};
use crate::utils::expires_at;

/// 会话缓存操作
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 缓存会话
    pub async fn cache_session(
        cache: &dyn Cache,
        session_id: &str,
        user_id: &str,
        username: &str,
        ttl: Duration,
    ) -> Result<CachedSession, CacheError> {
        let now = chrono::Utc::now().timestamp();
        let session = CachedSession {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            created_at: now,
            expires_at: expires_at(now, ttl),
        };

        Self::store(cache, &session, ttl).await?;
        Ok(session)
    }

    /// 获取会话，过期或无法解析的会话视为不存在
    pub async fn get_session(
        cache: &dyn Cache,
        session_id: &str,
    ) -> Result<Option<CachedSession>, CacheError> {
        let Some(bytes) = cache.get(&session_key(session_id)).await? else {
            return Ok(None);
        };

        let session: CachedSession = match serde_json::from_slice(&bytes) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding undecodable session {}: {}", session_id, e);
                return Ok(None);
            }
        };
        if session.expires_at <= chrono::Utc::now().timestamp() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// 删除会话
    pub async fn remove_session(cache: &dyn Cache, session_id: &str) -> Result<(), CacheError> {
        cache.delete(&session_key(session_id)).await
    }

    /// 刷新会话过期时间，会话不存在时返回 None
    pub async fn refresh_session(
        cache: &dyn Cache,
        session_id: &str,
        ttl: Duration,
    ) -> Result<Option<CachedSession>, CacheError> {
        match Self::get_session(cache, session_id).await? {
            Some(mut session) => {
                session.expires_at = expires_at(chrono::Utc::now().timestamp(), ttl);
                Self::store(cache, &session, ttl).await?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn store(
        cache: &dyn Cache,
        session: &CachedSession,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_vec(session)?;
        cache.set(&session_key(&session.session_id), json, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCache;

    #[tokio::test]
    async fn stored_session_can_be_loaded_and_removed() {
        let cache = MemoryCache::default();
        SessionCacheOperations::cache_session(&cache, "s1", "u1", "alice", Duration::from_secs(60))
            .await
            .unwrap();

        let loaded = SessionCacheOperations::get_session(&cache, "s1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.username, "alice");

        SessionCacheOperations::remove_session(&cache, "s1").await.unwrap();
        assert!(SessionCacheOperations::get_session(&cache, "s1").await.unwrap().is_none());
        // 重复删除不是错误
        SessionCacheOperations::remove_session(&cache, "s1").await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_session_is_treated_as_missing() {
        let cache = MemoryCache::default();
        cache
            .set(&session_key("s1"), b"{not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(SessionCacheOperations::get_session(&cache, "s1").await.unwrap().is_none());
        let refreshed =
            SessionCacheOperations::refresh_session(&cache, "s1", Duration::from_secs(60))
                .await
                .unwrap();
        assert!(refreshed.is_none());
    }

    #[tokio::test]
    async fn refreshing_a_missing_session_yields_none() {
        let cache = MemoryCache::default();
        let refreshed =
            SessionCacheOperations::refresh_session(&cache, "nope", Duration::from_secs(60))
                .await
                .unwrap();
        assert!(refreshed.is_none());
    }
}
