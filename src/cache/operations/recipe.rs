use std::time::Duration;

use crate::cache::Cache;
use crate::cache::keys::ALL_RECIPES_KEY;
use crate::database::{Recipe, RecipeStore, StoreError};

/// 菜谱列表的旁路缓存。缓存只是优化，缓存故障一律降级为告警
pub struct RecipeCacheOperations;

impl RecipeCacheOperations {
    /// Serves the full recipe list from the cache, falling back to the store on a miss
    /// and repopulating the cache with whatever the store returned (an empty list included).
    pub async fn list_recipes(
        cache: &dyn Cache,
        store: &dyn RecipeStore,
        ttl: Duration,
    ) -> Result<Vec<Recipe>, StoreError> {
        match cache.get(ALL_RECIPES_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Recipe>>(&bytes) {
                Ok(recipes) => {
                    tracing::debug!("Cache hit for {}", ALL_RECIPES_KEY);
                    return Ok(recipes);
                }
                Err(e) => {
                    tracing::warn!("Discarding undecodable entry {}: {}", ALL_RECIPES_KEY, e)
                }
            },
            Ok(None) => tracing::debug!("Cache miss for {}", ALL_RECIPES_KEY),
            Err(e) => tracing::warn!("Cache read for {} failed: {}", ALL_RECIPES_KEY, e),
        }

        let recipes = store.find_all().await?;

        match serde_json::to_vec(&recipes) {
            Ok(json) => {
                if let Err(e) = cache.set(ALL_RECIPES_KEY, json, ttl).await {
                    tracing::warn!("Cache write for {} failed: {}", ALL_RECIPES_KEY, e);
                }
            }
            Err(e) => tracing::warn!("Could not serialize recipe list: {}", e),
        }

        Ok(recipes)
    }

    /// 写操作成功后调用。删除失败只记录日志，缓存会在 TTL 到期后自愈
    pub async fn invalidate(cache: &dyn Cache) {
        if let Err(e) = cache.delete(ALL_RECIPES_KEY).await {
            tracing::warn!("Failed to invalidate {}: {}", ALL_RECIPES_KEY, e);
        }
    }
}
