use serde::Deserialize;
use uuid::Uuid;

use crate::database::RecipeFields;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub tag: Option<String>,
}

pub fn parse_recipe_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid recipe id `{}`", raw)))
}

pub fn validate_fields(fields: &RecipeFields) -> Result<(), AppError> {
    if fields.name.trim().is_empty() {
        return Err(AppError::Validation("recipe name is required".to_string()));
    }
    if fields.tags.iter().any(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("tags must not be blank".to_string()));
    }
    Ok(())
}
