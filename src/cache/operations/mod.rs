/// 缓存操作
pub mod recipe;
pub mod session;
pub mod token;
