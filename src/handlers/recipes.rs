// src/handlers/recipes.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::recipe::{recipe_image_file_path, Ingredient, NamePayload, Recipe, RecipePayload, Tag},
    services::{
        cascade::{self, Root},
        filters::{AssignedFilter, RecipeFilter},
        references::ensure_all_exist,
    },
};

// =============================================================================
//  TAGS
// =============================================================================

async fn find_tag(app_state: &AppState, id: Uuid) -> Result<Tag, AppError> {
    app_state
        .store
        .tags
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Tag não encontrada."))
}

async fn save_tag(app_state: &AppState, current: &Tag, payload: NamePayload) -> Result<Tag, AppError> {
    payload.validate()?;
    let record = payload.into_tag(current.id, current.owner_id, current.created_at)?;

    app_state
        .store
        .tags
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Tag não encontrada."))
}

// Só busca as receitas quando `assigned_only` foi pedido
async fn recipes_for(
    app_state: &AppState,
    filter: &AssignedFilter,
) -> Result<Option<Vec<Recipe>>, AppError> {
    if !filter.is_set() {
        return Ok(None);
    }
    Ok(Some(app_state.store.recipes.list().await?))
}

// GET /api/recipe/tags
#[utoipa::path(
    get,
    path = "/api/recipe/tags",
    tag = "Recipes",
    params(AssignedFilter),
    responses((status = 200, description = "Tags", body = Vec<Tag>)),
    security(("api_jwt" = []))
)]
pub async fn list_tags(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<AssignedFilter>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let mut tags = app_state.store.tags.list().await?;
    if let Some(recipes) = recipes_for(&app_state, &filter).await? {
        let assigned = AssignedFilter::assigned_ids(&recipes, |r| r.tags.as_slice());
        tags.retain(|tag| assigned.contains(&tag.id));
    }
    Ok(Json(tags))
}

// POST /api/recipe/tags
#[utoipa::path(
    post,
    path = "/api/recipe/tags",
    tag = "Recipes",
    request_body = NamePayload,
    responses(
        (status = 201, description = "Tag criada", body = Tag),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tag(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = payload.into_tag(Uuid::new_v4(), user.id, Utc::now())?;
    let tag = app_state.store.tags.insert(&record).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn get_tag(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(find_tag(&app_state, id).await?))
}

pub async fn update_tag(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<Tag>, AppError> {
    let current = find_tag(&app_state, id).await?;
    Ok(Json(save_tag(&app_state, &current, payload).await?))
}

pub async fn partial_update_tag(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<Tag>, AppError> {
    let current = find_tag(&app_state, id).await?;
    let payload = payload.merged_onto(&current.name);
    Ok(Json(save_tag(&app_state, &current, payload).await?))
}

pub async fn delete_tag(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Tag(id)).await? {
        return Err(AppError::NotFound("Tag não encontrada."));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  INGREDIENTES
// =============================================================================

async fn find_ingredient(app_state: &AppState, id: Uuid) -> Result<Ingredient, AppError> {
    app_state
        .store
        .ingredients
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Ingrediente não encontrado."))
}

async fn save_ingredient(
    app_state: &AppState,
    current: &Ingredient,
    payload: NamePayload,
) -> Result<Ingredient, AppError> {
    payload.validate()?;
    let record = payload.into_ingredient(current.id, current.owner_id, current.created_at)?;

    app_state
        .store
        .ingredients
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Ingrediente não encontrado."))
}

// GET /api/recipe/ingredients
#[utoipa::path(
    get,
    path = "/api/recipe/ingredients",
    tag = "Recipes",
    params(AssignedFilter),
    responses((status = 200, description = "Ingredientes", body = Vec<Ingredient>)),
    security(("api_jwt" = []))
)]
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<AssignedFilter>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let mut ingredients = app_state.store.ingredients.list().await?;
    if let Some(recipes) = recipes_for(&app_state, &filter).await? {
        let assigned = AssignedFilter::assigned_ids(&recipes, |r| r.ingredients.as_slice());
        ingredients.retain(|ingredient| assigned.contains(&ingredient.id));
    }
    Ok(Json(ingredients))
}

// POST /api/recipe/ingredients
#[utoipa::path(
    post,
    path = "/api/recipe/ingredients",
    tag = "Recipes",
    request_body = NamePayload,
    responses(
        (status = 201, description = "Ingrediente criado", body = Ingredient),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ingredient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let record = payload.into_ingredient(Uuid::new_v4(), user.id, Utc::now())?;
    let ingredient = app_state.store.ingredients.insert(&record).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn get_ingredient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, AppError> {
    Ok(Json(find_ingredient(&app_state, id).await?))
}

pub async fn update_ingredient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<Ingredient>, AppError> {
    let current = find_ingredient(&app_state, id).await?;
    Ok(Json(save_ingredient(&app_state, &current, payload).await?))
}

pub async fn partial_update_ingredient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<Ingredient>, AppError> {
    let current = find_ingredient(&app_state, id).await?;
    let payload = payload.merged_onto(&current.name);
    Ok(Json(save_ingredient(&app_state, &current, payload).await?))
}

pub async fn delete_ingredient(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Ingredient(id)).await? {
        return Err(AppError::NotFound("Ingrediente não encontrado."));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  RECEITAS
// =============================================================================

async fn find_recipe(app_state: &AppState, id: Uuid) -> Result<Recipe, AppError> {
    app_state
        .store
        .recipes
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Receita não encontrada."))
}

async fn build_recipe(
    app_state: &AppState,
    payload: RecipePayload,
    id: Uuid,
    owner_id: Uuid,
    image: Option<String>,
    created_at: DateTime<Utc>,
) -> Result<Recipe, AppError> {
    payload.validate()?;
    payload.validate_consistency()?;
    let record = payload.into_record(id, owner_id, image, created_at)?;

    ensure_all_exist(app_state.store.tags.as_ref(), "tags", &record.tags).await?;
    ensure_all_exist(app_state.store.ingredients.as_ref(), "ingredients", &record.ingredients).await?;

    Ok(record)
}

async fn save_recipe(
    app_state: &AppState,
    current: &Recipe,
    payload: RecipePayload,
) -> Result<Recipe, AppError> {
    let record = build_recipe(
        app_state,
        payload,
        current.id,
        current.owner_id,
        current.image.clone(),
        current.created_at,
    )
    .await?;

    app_state
        .store
        .recipes
        .update(&record)
        .await?
        .ok_or(AppError::NotFound("Receita não encontrada."))
}

// GET /api/recipe/recipes
#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    tag = "Recipes",
    params(RecipeFilter),
    responses(
        (status = 200, description = "Receitas", body = Vec<Recipe>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_recipes(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<RecipeFilter>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let conditions = filter.conditions()?;
    let recipes = app_state.store.recipes.list().await?;
    Ok(Json(conditions.apply(recipes)))
}

// POST /api/recipe/recipes
#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    tag = "Recipes",
    request_body = RecipePayload,
    responses(
        (status = 201, description = "Receita criada", body = Recipe),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_recipe(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<RecipePayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = build_recipe(&app_state, payload, Uuid::new_v4(), user.id, None, Utc::now()).await?;
    let recipe = app_state.store.recipes.insert(&record).await?;
    tracing::info!("🍰 Receita criada: {}", recipe);
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn get_recipe(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipe>, AppError> {
    Ok(Json(find_recipe(&app_state, id).await?))
}

pub async fn update_recipe(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RecipePayload>,
) -> Result<Json<Recipe>, AppError> {
    let current = find_recipe(&app_state, id).await?;
    Ok(Json(save_recipe(&app_state, &current, payload).await?))
}

pub async fn partial_update_recipe(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RecipePayload>,
) -> Result<Json<Recipe>, AppError> {
    let current = find_recipe(&app_state, id).await?;
    let payload = payload.merged_onto(&current);
    Ok(Json(save_recipe(&app_state, &current, payload).await?))
}

pub async fn delete_recipe(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !cascade::delete_cascading(&app_state.store, Root::Recipe(id)).await? {
        return Err(AppError::NotFound("Receita não encontrada."));
    }
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/recipe/recipes/{id}/upload-image
#[utoipa::path(
    post,
    path = "/api/recipe/recipes/{id}/upload-image",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Imagem gravada (multipart, campo `image`)", body = Recipe),
        (status = 400, description = "Nenhuma imagem enviada"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_image(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Recipe>, AppError> {
    let recipe = find_recipe(&app_state, id).await?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidPayload(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("image").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidPayload(e.body_text()))?;
        if bytes.is_empty() {
            break;
        }

        let relative = recipe_image_file_path(&filename);
        let full_path = app_state.config.media_root.join(&relative);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar {}: {}", parent.display(), e))?;
        }
        tokio::fs::write(&full_path, &bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar {}: {}", full_path.display(), e))?;

        stored = Some(relative);
        break;
    }

    let image = stored.ok_or_else(|| AppError::field("image", "required", "Nenhuma imagem enviada."))?;
    tracing::info!("🖼️ Imagem da receita {} gravada em {}", recipe.id, image);

    let updated = Recipe {
        image: Some(image),
        ..recipe
    };
    let saved = app_state
        .store
        .recipes
        .update(&updated)
        .await?
        .ok_or(AppError::NotFound("Receita não encontrada."))?;

    Ok(Json(saved))
}
