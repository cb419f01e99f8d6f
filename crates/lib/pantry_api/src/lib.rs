//! # pantry_api
//!
//! HTTP API library for Pantry.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use chrono::Duration;
use pantry_core::auth::token::DEFAULT_TOKEN_TTL_SECS;
use pantry_core::auth::{CredentialStore, PgCredentialStore, TokenService};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, cookbooks, recipes, tags, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Account lookups for login and token verification.
    pub accounts: Arc<dyn CredentialStore>,
    /// Token issuance and verification.
    pub tokens: TokenService,
}

impl AppState {
    /// State backed by the `users` table of `pool`.
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let accounts = Arc::new(PgCredentialStore::new(pool.clone()));
        Self::with_accounts(pool, config, accounts)
    }

    /// State with an explicit credential store.
    pub fn with_accounts(
        pool: PgPool,
        config: ApiConfig,
        accounts: Arc<dyn CredentialStore>,
    ) -> Self {
        let ttl = Duration::try_seconds(config.token_ttl_secs).unwrap_or_else(|| {
            warn!(
                secs = config.token_ttl_secs,
                "token lifetime out of range; using the default"
            );
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
        });
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), ttl);
        Self {
            pool,
            config,
            accounts,
            tokens,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `pantry_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    pantry_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(values))
}

/// Builds the Axum router with all routes and shared state.
///
/// Every request passes the access gate first, then the authorization
/// policy, then reaches its handler.
pub fn router(state: AppState) -> Router {
    use crate::routes as r;

    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        // Accounts
        .route(r::POST_USERS_REGISTER, post(auth::register_handler))
        .route(r::POST_USERS_LOGIN, post(auth::login_handler))
        .route(r::GET_USERS_VALIDATE, get(auth::validate_handler))
        .route(r::GET_USERS, get(users::list_users_handler))
        .route(r::GET_USERS_ME, get(users::me_handler))
        .route(r::GET_USERS_FAVOURITES, get(users::favourites_handler))
        .route(r::PUT_USERS_PROFILE, put(users::update_profile_handler))
        .route(r::GET_USERS_ID, get(users::profile_handler))
        // Recipes
        .route(
            r::RECIPES,
            get(recipes::list_recipes_handler)
                .post(recipes::create_recipe_handler)
                .put(recipes::update_recipe_handler),
        )
        .route(r::GET_RECIPES_USER, get(recipes::my_recipes_handler))
        .route(r::GET_RECIPES_USER_ID, get(recipes::user_recipes_handler))
        .route(r::GET_RECIPES_SEARCH, get(recipes::search_recipes_handler))
        .route(
            r::RECIPES_RECIPE_ID,
            get(recipes::get_recipe_handler).delete(recipes::delete_recipe_handler),
        )
        .route(
            r::RECIPES_ID_FAVOURITE,
            post(recipes::add_favourite_handler).delete(recipes::remove_favourite_handler),
        )
        // Tags
        .route(r::GET_TAGS, get(tags::list_tags_handler))
        // Cookbooks
        .route(
            r::COOKBOOKS,
            get(cookbooks::list_cookbooks_handler).post(cookbooks::create_cookbook_handler),
        )
        .route(r::GET_COOKBOOKS_SEARCH, get(cookbooks::search_cookbooks_handler))
        .route(r::GET_COOKBOOKS_USER, get(cookbooks::my_cookbooks_handler))
        .route(r::GET_COOKBOOKS_USER_ID, get(cookbooks::user_cookbooks_handler))
        .route(
            r::COOKBOOKS_ID,
            get(cookbooks::get_cookbook_handler)
                .put(cookbooks::update_cookbook_handler)
                .delete(cookbooks::delete_cookbook_handler),
        )
        .route(
            r::COOKBOOKS_ID_RECIPES_ID,
            post(cookbooks::add_recipe_handler).delete(cookbooks::remove_recipe_handler),
        )
        .route(
            r::COOKBOOKS_ID_COLLABORATORS,
            post(cookbooks::add_collaborator_handler)
                .delete(cookbooks::remove_collaborator_handler),
        )
        // Administration
        .route(r::POST_ADMIN_LOGIN, post(auth::admin_login_handler))
        .route(r::GET_ADMIN_VALIDATE, get(auth::validate_handler))
        .route(r::GET_ADMIN_USERS, get(admin::list_users_handler))
        .route(r::DELETE_ADMIN_USERS_ID, delete(admin::delete_user_handler))
        .route(r::GET_ADMIN_RECIPES, get(admin::list_recipes_handler))
        .route(r::DELETE_ADMIN_RECIPES_ID, delete(admin::delete_recipe_handler))
        .method_not_allowed_fallback(extract::method_not_allowed)
        .fallback(extract::not_found)
        .layer(axum::middleware::from_fn(middleware::policy::enforce))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::identify,
        ))
        .layer(cors)
        .with_state(state)
}
