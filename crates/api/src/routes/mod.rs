//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database ping)
//!
//! # Accounts
//! POST   /api/auth/register         - Create account, returns token
//! POST   /api/auth/login            - Username or email + password, returns token
//! GET    /api/auth/profile          - Current user (bearer)
//!
//! # Catalog
//! POST   /api/categories            - Create category (admin)
//! POST   /api/products              - Create product (admin)
//! GET    /api/products/{id}         - Product lookup
//! PATCH  /api/products/{id}         - Reprice / restock (admin)
//!
//! # Cart (bearer)
//! GET    /api/cart                  - Cart with totals
//! POST   /api/cart/add              - Add or merge a line
//! PUT    /api/cart/update/{id}      - Set quantity (>= 1)
//! DELETE /api/cart/remove/{id}      - Remove a line
//! DELETE /api/cart/clear            - Empty the cart
//!
//! # Orders (bearer)
//! POST   /api/orders/create         - Place an order from the cart
//! GET    /api/orders                - Order history
//! GET    /api/orders/{id}           - Order detail
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(catalog::create_category))
        .route("/products", post(catalog::create_product))
        .route(
            "/products/{id}",
            get(catalog::get_product).patch(catalog::update_product),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::view))
        .route("/add", post(cart::add))
        .route("/update/{id}", put(cart::update))
        .route("/remove/{id}", delete(cart::remove))
        .route("/clear", delete(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/create", post(orders::create))
        .route("/{id}", get(orders::detail))
}

/// Create the main application router (without state or layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api", catalog_routes())
}

/// The full application: routes, state, request ids, tracing and CORS.
///
/// Sentry layers are added by the binary, outside this stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().allowed_origins);

    routes()
        .with_state(state)
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
}

/// CORS for the browser frontend. An empty list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}
