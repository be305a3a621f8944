//! In-memory stand-ins for the store of record and the cache, plus state builders for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::AppState;
use crate::cache::{Cache, CacheError};
use crate::config::{AuthMode, Config};
use crate::database::{Recipe, RecipeFields, RecipeStore, StoreError, User, UserStore};

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw bytes under `key`, ignoring the failure switch.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value.clone())
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        let expires = Instant::now() + ttl.max(Duration::from_secs(1));
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, expires));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRecipeStore {
    recipes: Mutex<Vec<Recipe>>,
    find_all_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryRecipeStore {
    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.recipes.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        self.check()?;
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError> {
        self.check()?;
        let recipes = self.recipes.lock().unwrap();
        Ok(recipes
            .iter()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.check()?;
        self.recipes.lock().unwrap().push(recipe.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, fields: &RecipeFields) -> Result<bool, StoreError> {
        self.check()?;
        let mut recipes = self.recipes.lock().unwrap();
        match recipes.iter_mut().find(|r| r.id == id) {
            Some(recipe) => {
                recipe.name = fields.name.clone();
                recipe.tags = fields.tags.clone();
                recipe.ingredients = fields.ingredients.clone();
                recipe.instructions = fields.instructions.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut recipes = self.recipes.lock().unwrap();
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        Ok(recipes.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    /// Stores a record as-is, bypassing signup validation.
    pub fn put(&self, user: User) {
        self.users
            .lock()
            .unwrap()
            .insert(user.username.clone(), user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}

pub fn test_config(auth_mode: AuthMode) -> Config {
    Config {
        database_url: "postgres://localhost/recipes_test".into(),
        database_max_connections: 1,
        redis_url: "redis://localhost".into(),
        auth_mode,
        jwt_secret: "test-secret".into(),
        jwt_access_ttl_secs: 600,
        jwt_refresh_ttl_secs: 3600,
        session_ttl_secs: 600,
        recipes_cache_ttl_secs: 3600,
        protect_list: false,
        bcrypt_cost: 4,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: String::new(),
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub recipes: Arc<MemoryRecipeStore>,
    pub cache: Arc<MemoryCache>,
}

pub fn harness(config: Config) -> TestHarness {
    let users = Arc::new(MemoryUserStore::default());
    let recipes = Arc::new(MemoryRecipeStore::default());
    let cache = Arc::new(MemoryCache::default());
    let state = AppState::new(config, users.clone(), recipes.clone(), cache.clone())
        .expect("test configuration is valid");

    TestHarness {
        state,
        users,
        recipes,
        cache,
    }
}
