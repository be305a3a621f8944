use std::sync::Arc;

use auth::AuthStrategy;
use cache::Cache;
use config::{Config, ConfigError};
use database::{RecipeStore, UserStore};

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod utils;

#[cfg(test)]
mod testing;

/// 应用状态，启动时构建一次，按引用注入每个处理函数
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub cache: Arc<dyn Cache>,
    pub auth: Arc<AuthStrategy>,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        recipes: Arc<dyn RecipeStore>,
        cache: Arc<dyn Cache>,
    ) -> Result<Self, ConfigError> {
        let auth = AuthStrategy::from_config(&config, cache.clone())?;
        Ok(Self {
            config: Arc::new(config),
            users,
            recipes,
            cache,
            auth: Arc::new(auth),
        })
    }
}
