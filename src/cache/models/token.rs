use serde::{Deserialize, Serialize};

/// 已吊销的令牌族，sid 相同的访问令牌和刷新令牌一并失效
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RevokedSession {
    pub session_id: String,
    pub user_id: String,
    pub revoked_at: i64, // Unix timestamp
}
