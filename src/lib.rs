// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta o router completo. O `main` e os testes de integração usam o mesmo.
pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route(
            "/me",
            get(handlers::auth::get_me)
                .patch(handlers::auth::update_me)
                .delete(handlers::auth::delete_me),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let heroad_routes = Router::new()
        .route(
            "/addresses",
            get(handlers::addresses::list_addresses).post(handlers::addresses::create_address),
        )
        .route(
            "/addresses/{id}",
            get(handlers::addresses::get_address)
                .put(handlers::addresses::update_address)
                .patch(handlers::addresses::partial_update_address)
                .delete(handlers::addresses::delete_address),
        )
        .route(
            "/vehicles",
            get(handlers::vehicles::list_vehicles).post(handlers::vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(handlers::vehicles::get_vehicle)
                .put(handlers::vehicles::update_vehicle)
                .patch(handlers::vehicles::partial_update_vehicle)
                .delete(handlers::vehicles::delete_vehicle),
        )
        .route(
            "/patients",
            get(handlers::patients::list_patients).post(handlers::patients::create_patient),
        )
        .route(
            "/patients/{id}",
            get(handlers::patients::get_patient)
                .put(handlers::patients::update_patient)
                .patch(handlers::patients::partial_update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .route(
            "/runs",
            get(handlers::runs::list_runs).post(handlers::runs::create_run),
        )
        .route(
            "/runs/{id}",
            get(handlers::runs::get_run)
                .put(handlers::runs::update_run)
                .patch(handlers::runs::partial_update_run)
                .delete(handlers::runs::delete_run),
        )
        .route(
            "/master-runs",
            get(handlers::master_runs::list_master_runs)
                .post(handlers::master_runs::create_master_run),
        )
        .route(
            "/master-runs/{id}",
            get(handlers::master_runs::get_master_run)
                .put(handlers::master_runs::update_master_run)
                .patch(handlers::master_runs::partial_update_master_run)
                .delete(handlers::master_runs::delete_master_run),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let recipe_routes = Router::new()
        .route(
            "/tags",
            get(handlers::recipes::list_tags).post(handlers::recipes::create_tag),
        )
        .route(
            "/tags/{id}",
            get(handlers::recipes::get_tag)
                .put(handlers::recipes::update_tag)
                .patch(handlers::recipes::partial_update_tag)
                .delete(handlers::recipes::delete_tag),
        )
        .route(
            "/ingredients",
            get(handlers::recipes::list_ingredients).post(handlers::recipes::create_ingredient),
        )
        .route(
            "/ingredients/{id}",
            get(handlers::recipes::get_ingredient)
                .put(handlers::recipes::update_ingredient)
                .patch(handlers::recipes::partial_update_ingredient)
                .delete(handlers::recipes::delete_ingredient),
        )
        .route(
            "/recipes",
            get(handlers::recipes::list_recipes).post(handlers::recipes::create_recipe),
        )
        .route(
            "/recipes/{id}",
            get(handlers::recipes::get_recipe)
                .put(handlers::recipes::update_recipe)
                .patch(handlers::recipes::partial_update_recipe)
                .delete(handlers::recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/upload-image",
            post(handlers::recipes::upload_image),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/heroad", heroad_routes)
        .nest("/api/recipe", recipe_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
