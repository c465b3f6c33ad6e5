//! YomiTomo HTTP gateway
//!
//! Routes:
//! - `/api/admin/*`: login, logout, status, admin bootstrap and the
//!   admin-only manga/chapter mutations
//! - `/api/*`: public reads and comment posting
//! - `/`, `/admin`, `/manga/{id}`, `/read/{id}`: HTML shells
//! - `/uploads/*`: stored images
//! - `/health`, `/ready`, `/metrics`: operations

pub mod extract;
pub mod handlers;
pub mod middleware;
mod state;

pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Login is the only route worth throttling
    let login: MethodRouter<AppState> = post(handlers::admin::login);
    let login = if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.login_per_second,
            config.rate_limit.burst,
        );
        login.route_layer(from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit_middleware,
        ))
    } else {
        login
    };

    let admin_routes = Router::new()
        .route("/login", login)
        .route("/logout", post(handlers::admin::logout))
        .route("/status", get(handlers::admin::status))
        .route("/create", post(handlers::admin::create_admin))
        .route("/manga", post(handlers::manga::create_manga))
        .route(
            "/manga/{id}",
            put(handlers::manga::update_manga).delete(handlers::manga::delete_manga),
        )
        .route("/chapter", post(handlers::chapters::create_chapter))
        .route(
            "/chapter/{id}",
            put(handlers::chapters::update_chapter).delete(handlers::chapters::delete_chapter),
        );

    let api_routes = Router::new()
        .nest("/admin", admin_routes)
        .route("/manga", get(handlers::manga::list_manga))
        .route("/manga/{id}", get(handlers::manga::get_manga))
        .route("/chapter/{id}", get(handlers::chapters::get_chapter))
        .route("/comment", post(handlers::comments::post_comment))
        .route_layer(from_fn(middleware::metrics::track_metrics));

    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        .merge(handlers::pages::routes(&config.public.directory))
        .nest_service(
            state.uploads.public_prefix(),
            ServeDir::new(state.uploads.root()),
        )
        .fallback_service(ServeDir::new(&config.public.directory))
        .layer(DefaultBodyLimit::max(config.uploads.max_body_bytes))
        .layer(propagate_id)
        .layer(TraceLayer::new_for_http())
        .layer(request_id)
        .with_state(state)
}
