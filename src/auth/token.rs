use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Authorizer, Identity};
use crate::cache::{Cache, TokenCacheOperations};
use crate::database::User;
use crate::error::AppError;
use crate::utils::expires_at;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // 用户ID
    pub username: String, // 用户名
    pub sid: String,      // 会话ID，访问令牌与刷新令牌共享
    pub kind: TokenKind,
    pub iat: i64, // 签发时间
    pub exp: i64, // 过期时间
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub user_id: String,
    pub username: String,
    pub token_type: &'static str,
    pub access_token: String,
    pub access_expires_at: i64,
    pub refresh_token: String,
    pub refresh_expires_at: i64,
}

/// HS256 bearer tokens. Refresh tokens are not rotated: `/refresh` hands back the same
/// refresh token alongside a fresh access token. Signing out revokes the whole lineage.
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    // 注销时允许已过期的令牌，签名仍需校验
    sign_out_validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    cache: Arc<dyn Cache>,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

impl JwtAuth {
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        cache: Arc<dyn Cache>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let mut sign_out_validation = validation.clone();
        sign_out_validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            sign_out_validation,
            access_ttl,
            refresh_ttl,
            cache,
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    fn mint(
        &self,
        user_id: &str,
        username: &str,
        sid: &str,
        kind: TokenKind,
    ) -> Result<(String, i64), AppError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now().timestamp();
        let expiration = expires_at(now, ttl);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            sid: sid.to_string(),
            kind,
            iat: now,
            exp: expiration,
        };

        Ok((self.encode(&claims)?, expiration))
    }

    /// Checks signature and expiry only. Any failure is reported as [`AppError::Unauthorized`].
    fn decode_any(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                AppError::Unauthorized
            })
    }

    pub fn decode(&self, token: &str, kind: TokenKind) -> Result<Claims, AppError> {
        let claims = self.decode_any(token)?;
        if claims.kind != kind {
            tracing::debug!("Rejected {:?} token where {:?} was expected", claims.kind, kind);
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    async fn ensure_not_revoked(&self, claims: &Claims) -> Result<(), AppError> {
        if TokenCacheOperations::is_revoked(self.cache.as_ref(), &claims.sid).await? {
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }

    pub fn issue(&self, user: &User) -> Result<TokenPair, AppError> {
        let user_id = user.user_id.to_string();
        let sid = Uuid::new_v4().to_string();

        let (access_token, access_expires_at) =
            self.mint(&user_id, &user.username, &sid, TokenKind::Access)?;
        let (refresh_token, refresh_expires_at) =
            self.mint(&user_id, &user.username, &sid, TokenKind::Refresh)?;

        Ok(TokenPair {
            user_id,
            username: user.username.clone(),
            token_type: "Bearer",
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        self.ensure_not_revoked(&claims).await?;

        let (access_token, access_expires_at) =
            self.mint(&claims.sub, &claims.username, &claims.sid, TokenKind::Access)?;
        tracing::debug!("Refreshed access token for user {}", claims.sub);

        Ok(TokenPair {
            user_id: claims.sub,
            username: claims.username,
            token_type: "Bearer",
            access_token,
            access_expires_at,
            refresh_token: refresh_token.to_string(),
            refresh_expires_at: claims.exp,
        })
    }

    /// Accepts either token of a lineage, expired or not, as long as the signature holds.
    /// Tokens that fail verification have nothing to revoke.
    pub async fn sign_out(&self, token: Option<&str>) -> Result<(), AppError> {
        let claims = token.and_then(|t| {
            decode::<Claims>(t, &self.decoding_key, &self.sign_out_validation)
                .map(|data| data.claims)
                .inspect_err(|e| tracing::debug!("Ignoring sign-out token: {}", e))
                .ok()
        });
        let Some(claims) = claims else {
            return Ok(());
        };

        // 吊销记录需活过该令牌族中任何令牌
        let ttl = self.refresh_ttl.saturating_add(self.access_ttl);
        TokenCacheOperations::revoke_session(self.cache.as_ref(), &claims.sid, &claims.sub, ttl)
            .await?;
        tracing::info!("User {} signed out", claims.sub);
        Ok(())
    }
}

#[async_trait]
impl Authorizer for JwtAuth {
    async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
        let claims = self.decode(&token, TokenKind::Access)?;
        self.ensure_not_revoked(&claims).await?;

        Ok(Identity {
            user_id: claims.sub,
            username: claims.username,
            session_id: Some(claims.sid),
        })
    }
}
