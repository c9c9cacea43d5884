pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::database::models::{Project, Supply};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::state::AppState;

/// Build the full HTTP application over `state`
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/register", post(public::register))
        .route("/auth/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::resource::{create, delete, list, read, update};

    Router::new()
        .route("/auth/me", get(protected::me))
        .route("/projects", get(list::<Project>).post(create::<Project>))
        .route(
            "/projects/:id",
            get(read::<Project>).put(update::<Project>).delete(delete::<Project>),
        )
        .route("/supplies", get(list::<Supply>).post(create::<Supply>))
        .route(
            "/supplies/:id",
            get(read::<Supply>).put(update::<Supply>).delete(delete::<Supply>),
        )
        // Layers run outermost-last: the JWT check wraps the user lookup
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(AllowOrigin::list(origins)))
}
