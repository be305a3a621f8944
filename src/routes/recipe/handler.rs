use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::Identity,
    cache::RecipeCacheOperations,
    database::{Recipe, RecipeFields},
    error::AppError,
    utils::{MessageResponse, success_to_api_response},
};

use super::model::{SearchParams, parse_recipe_id, validate_fields};

fn fields_from(
    payload: Result<Json<RecipeFields>, JsonRejection>,
) -> Result<RecipeFields, AppError> {
    let Json(fields) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    validate_fields(&fields)?;
    Ok(fields)
}

/// 旁路缓存读取全部菜谱
#[axum::debug_handler]
pub async fn list_recipes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = RecipeCacheOperations::list_recipes(
        state.cache.as_ref(),
        state.recipes.as_ref(),
        state.config.recipes_cache_ttl(),
    )
    .await?;

    Ok(success_to_api_response(recipes))
}

#[axum::debug_handler]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let tag = params
        .tag
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("query parameter `tag` is required".to_string()))?;

    let recipes = state.recipes.find_by_tag(&tag).await?;
    Ok(success_to_api_response(recipes))
}

#[axum::debug_handler]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_recipe_id(&id)?;
    let recipe = state
        .recipes
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("recipe"))?;

    Ok(success_to_api_response(recipe))
}

#[axum::debug_handler]
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<RecipeFields>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = Recipe::publish(fields_from(payload)?);
    state.recipes.insert(&recipe).await?;
    tracing::info!("Recipe {} created by {}", recipe.id, identity.username);

    RecipeCacheOperations::invalidate(state.cache.as_ref()).await;
    Ok((StatusCode::CREATED, success_to_api_response(recipe)))
}

#[axum::debug_handler]
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeFields>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_recipe_id(&id)?;
    let fields = fields_from(payload)?;

    if !state.recipes.update(id, &fields).await? {
        return Err(AppError::NotFound("recipe"));
    }
    tracing::info!("Recipe {} updated by {}", id, identity.username);

    RecipeCacheOperations::invalidate(state.cache.as_ref()).await;
    Ok(success_to_api_response(MessageResponse {
        message: "Recipe has been updated",
    }))
}

#[axum::debug_handler]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_recipe_id(&id)?;

    if !state.recipes.delete(id).await? {
        return Err(AppError::NotFound("recipe"));
    }
    tracing::info!("Recipe {} deleted by {}", id, identity.username);

    RecipeCacheOperations::invalidate(state.cache.as_ref()).await;
    Ok(success_to_api_response(MessageResponse {
        message: "Recipe has been deleted",
    }))
}
