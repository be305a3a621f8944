use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    #[sqlx(rename = "recipe_id")]
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

/// Client-editable part of a recipe. Identifier and publication time are owned by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFields {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Postgres 的 TIMESTAMPTZ 只到微秒
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

impl Recipe {
    pub fn publish(fields: RecipeFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: fields.name,
            tags: fields.tags,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            published_at: now_micros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_time_fits_the_column_precision() {
        let recipe = Recipe::publish(RecipeFields {
            name: "Tacos".into(),
            ..Default::default()
        });

        assert_eq!(recipe.published_at.timestamp_subsec_nanos() % 1_000, 0);
        let json = serde_json::to_value(&recipe).unwrap();
        let parsed: DateTime<Utc> = json["publishedAt"].as_str().unwrap().parse().unwrap();
        assert_eq!(parsed, recipe.published_at);
    }
}
