//! 认证：凭据校验、会话/令牌签发、请求鉴权
//!
//! Three interchangeable strategies are selected at startup from `AUTH_MODE`:
//! no authentication, server-side sessions carried in a cookie, and signed bearer
//! tokens with a refresh lineage. Handlers only ever see the resolved [`Identity`].

mod session;
mod token;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::cache::Cache;
use crate::config::{AuthMode, Config, ConfigError};
use crate::database::UserStore;
use crate::error::AppError;
use crate::utils::{hash_password, verify_password};

pub use session::{SESSION_COOKIE, SessionAuth, SessionTicket, session_id_from};
pub use token::{Claims, JwtAuth, TokenKind, TokenPair, bearer_token};

/// 调用者身份，由鉴权中间件写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub session_id: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            username: "anonymous".to_string(),
            session_id: None,
        }
    }
}

/// Resolves the caller of a request from its headers, or rejects it.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AppError>;
}

/// 签发结果
#[derive(Debug)]
pub enum Issued {
    Tokens(TokenPair),
    Session(SessionTicket),
}

enum Strategy {
    NoAuth,
    Session(SessionAuth),
    Token(JwtAuth),
}

pub struct AuthStrategy {
    strategy: Strategy,
    // 未知用户名时参与比对的占位哈希，与真实哈希同成本
    decoy_hash: String,
}

impl AuthStrategy {
    pub fn from_config(config: &Config, cache: Arc<dyn Cache>) -> Result<Self, ConfigError> {
        let strategy = match config.auth_mode {
            AuthMode::None => Strategy::NoAuth,
            AuthMode::Session => Strategy::Session(SessionAuth::new(config.session_ttl(), cache)),
            AuthMode::Token => {
                if config.jwt_secret.trim().is_empty() {
                    return Err(ConfigError::Missing("JWT_SECRET"));
                }
                Strategy::Token(JwtAuth::new(
                    &config.jwt_secret,
                    config.access_token_ttl(),
                    config.refresh_token_ttl(),
                    cache,
                ))
            }
        };
        let decoy_hash = hash_password(&Uuid::new_v4().to_string(), config.bcrypt_cost)
            .map_err(|_| ConfigError::InvalidBcryptCost(config.bcrypt_cost))?;

        Ok(Self {
            strategy,
            decoy_hash,
        })
    }

    pub fn mode(&self) -> AuthMode {
        match self.strategy {
            Strategy::NoAuth => AuthMode::None,
            Strategy::Session(_) => AuthMode::Session,
            Strategy::Token(_) => AuthMode::Token,
        }
    }

    /// Unknown usernames and wrong passwords produce the same [`AppError::Unauthorized`] after
    /// the same amount of hashing work.
    pub async fn sign_in(
        &self,
        users: &dyn UserStore,
        username: &str,
        password: &str,
    ) -> Result<Issued, AppError> {
        let Some(user) = users.find_by_username(username).await? else {
            let _ = verify_password(password, &self.decoy_hash);
            tracing::info!("Sign-in rejected: unknown username");
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::info!("Sign-in rejected for user {}", user.user_id);
            return Err(AppError::Unauthorized);
        }

        let issued = match &self.strategy {
            Strategy::NoAuth => {
                return Err(AppError::Internal("authentication is disabled".into()));
            }
            Strategy::Session(auth) => Issued::Session(auth.issue(&user).await?),
            Strategy::Token(auth) => Issued::Tokens(auth.issue(&user)?),
        };
        tracing::info!("User {} signed in", user.user_id);
        Ok(issued)
    }

    /// 使用刷新凭据换取新的访问凭据，无需重新输入密码
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<Issued, AppError> {
        match &self.strategy {
            Strategy::NoAuth => Err(AppError::Internal("authentication is disabled".into())),
            Strategy::Session(auth) => {
                let session_id = session_id_from(headers).ok_or(AppError::Unauthorized)?;
                Ok(Issued::Session(auth.refresh(&session_id).await?))
            }
            Strategy::Token(auth) => {
                let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
                Ok(Issued::Tokens(auth.refresh(&token).await?))
            }
        }
    }

    /// 幂等：缺失、未知、已过期或已注销的凭据都不是错误
    pub async fn sign_out(&self, headers: &HeaderMap) -> Result<(), AppError> {
        match &self.strategy {
            Strategy::NoAuth => Ok(()),
            Strategy::Session(auth) => auth.sign_out(session_id_from(headers).as_deref()).await,
            Strategy::Token(auth) => auth.sign_out(bearer_token(headers).as_deref()).await,
        }
    }
}

#[async_trait]
impl Authorizer for AuthStrategy {
    async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        match &self.strategy {
            Strategy::NoAuth => Ok(Identity::anonymous()),
            Strategy::Session(auth) => auth.authorize(headers).await,
            Strategy::Token(auth) => auth.authorize(headers).await,
        }
    }
}
