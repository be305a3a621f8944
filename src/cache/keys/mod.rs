// 缓存键
// 菜谱列表只有一个固定键，没有按菜谱划分的条目

/// 全部菜谱列表缓存键
pub const ALL_RECIPES_KEY: &str = "recipes:all";

/// 会话缓存键前缀
const SESSION_PREFIX: &str = "session:";

/// 已吊销会话（令牌族）键前缀
const REVOKED_PREFIX: &str = "token:revoked:";

pub fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_PREFIX, session_id)
}

pub fn revoked_session_key(session_id: &str) -> String {
    format!("{}{}", REVOKED_PREFIX, session_id)
}
