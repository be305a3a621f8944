// 数据库模块
// 包含实体定义和存储接口及其 Postgres 实现

pub mod models;
pub mod operations;

use sqlx::PgPool;

pub use models::recipe::{Recipe, RecipeFields};
pub use models::user::User;
pub use operations::recipe::{PgRecipeStore, RecipeStore};
pub use operations::user::{PgUserStore, UserStore};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// 建表，可重复执行
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
