/// 缓存数据模型
pub mod session;
pub mod token;

pub use session::CachedSession;
pub use token::RevokedSession;
