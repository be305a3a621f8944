use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{Recipe, RecipeFields, StoreError};

/// 菜谱存储
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError>;
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError>;
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError>;
    /// Returns `false` when no recipe has the given id.
    async fn update(&self, id: Uuid, fields: &RecipeFields) -> Result<bool, StoreError>;
    /// Returns `false` when no recipe has the given id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT recipe_id, name, tags, ingredients, instructions, published_at
            FROM recipes
            ORDER BY published_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT recipe_id, name, tags, ingredients, instructions, published_at
            FROM recipes
            WHERE recipe_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT recipe_id, name, tags, ingredients, instructions, published_at
            FROM recipes
            WHERE $1 = ANY(tags)
            ORDER BY published_at
            "#,
        )
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO recipes (recipe_id, name, tags, ingredients, instructions, published_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.tags)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.published_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, id: Uuid, fields: &RecipeFields) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1, tags = $2, ingredients = $3, instructions = $4
            WHERE recipe_id = $5
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.tags)
        .bind(&fields.ingredients)
        .bind(&fields.instructions)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
