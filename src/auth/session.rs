use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use uuid::Uuid;

use super::{Authorizer, Identity};
use crate::cache::{Cache, SessionCacheOperations};
use crate::cache::models::CachedSession;
use crate::database::User;
use crate::error::AppError;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "recipes_session";

#[derive(Debug, Clone, Serialize)]
pub struct SessionTicket {
    pub user_id: String,
    pub username: String,
    pub expires_at: i64,
    /// Travels in the cookie only.
    #[serde(skip_serializing)]
    pub session_id: String,
}

impl From<CachedSession> for SessionTicket {
    fn from(session: CachedSession) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            expires_at: session.expires_at,
            session_id: session.session_id,
        }
    }
}

pub fn session_id_from(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

/// Server-side sessions kept in the cache under `session:<id>`. The session id is both the
/// access and the refresh credential; refreshing slides its expiry forward.
pub struct SessionAuth {
    ttl: Duration,
    cache: Arc<dyn Cache>,
}

impl SessionAuth {
    pub fn new(ttl: Duration, cache: Arc<dyn Cache>) -> Self {
        Self { ttl, cache }
    }

    pub async fn issue(&self, user: &User) -> Result<SessionTicket, AppError> {
        let session_id = Uuid::new_v4().to_string();
        let session = SessionCacheOperations::cache_session(
            self.cache.as_ref(),
            &session_id,
            &user.user_id.to_string(),
            &user.username,
            self.ttl,
        )
        .await?;

        Ok(session.into())
    }

    pub async fn refresh(&self, session_id: &str) -> Result<SessionTicket, AppError> {
        SessionCacheOperations::refresh_session(self.cache.as_ref(), session_id, self.ttl)
            .await?
            .map(SessionTicket::from)
            .ok_or(AppError::Unauthorized)
    }

    pub async fn sign_out(&self, session_id: Option<&str>) -> Result<(), AppError> {
        if let Some(session_id) = session_id {
            SessionCacheOperations::remove_session(self.cache.as_ref(), session_id).await?;
            tracing::info!("Session {} closed", session_id);
        }
        Ok(())
    }
}

#[async_trait]
impl Authorizer for SessionAuth {
    async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        let session_id = session_id_from(headers).ok_or(AppError::Unauthorized)?;
        let session = SessionCacheOperations::get_session(self.cache.as_ref(), &session_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(Identity {
            user_id: session.user_id,
            username: session.username,
            session_id: Some(session.session_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCache;

    fn cookie(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            format!("theme=dark; {}={}", SESSION_COOKIE, session_id)
                .parse()
                .unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn issued_session_authorizes_until_signed_out() {
        let auth = SessionAuth::new(Duration::from_secs(60), Arc::new(MemoryCache::default()));
        let user = User::new("alice".into(), "unused".into());
        let ticket = auth.issue(&user).await.unwrap();

        let identity = auth.authorize(&cookie(&ticket.session_id)).await.unwrap();
        assert_eq!(identity.user_id, user.user_id.to_string());

        auth.sign_out(Some(&ticket.session_id)).await.unwrap();
        auth.sign_out(Some(&ticket.session_id)).await.unwrap();
        assert!(matches!(
            auth.authorize(&cookie(&ticket.session_id)).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn missing_or_unknown_cookie_is_rejected() {
        let auth = SessionAuth::new(Duration::from_secs(60), Arc::new(MemoryCache::default()));
        assert!(auth.authorize(&HeaderMap::new()).await.is_err());
        assert!(auth.authorize(&cookie("forged")).await.is_err());
        assert!(auth.refresh("forged").await.is_err());
    }

    #[tokio::test]
    async fn session_lapses_after_its_ttl() {
        let auth = SessionAuth::new(Duration::from_secs(1), Arc::new(MemoryCache::default()));
        let ticket = auth
            .issue(&User::new("alice".into(), "unused".into()))
            .await
            .unwrap();
        assert!(auth.authorize(&cookie(&ticket.session_id)).await.is_ok());

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(auth.authorize(&cookie(&ticket.session_id)).await.is_err());
    }

    #[tokio::test]
    async fn refresh_extends_a_live_session() {
        let auth = SessionAuth::new(Duration::from_secs(60), Arc::new(MemoryCache::default()));
        let ticket = auth
            .issue(&User::new("alice".into(), "unused".into()))
            .await
            .unwrap();

        let refreshed = auth.refresh(&ticket.session_id).await.unwrap();
        assert_eq!(refreshed.session_id, ticket.session_id);
        assert!(refreshed.expires_at >= ticket.expires_at);
    }
}
