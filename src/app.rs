use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::MySqlPool;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::config;
use crate::email::Mailer;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin, require_superadmin};

/// Shared handles passed to every handler and service
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: MySqlPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }
}

pub fn router(state: AppState) -> Router {
    let config = config();

    Router::new()
        .merge(public_routes())
        .nest("/api/admin", admin_routes(state.clone()))
        .nest("/api/superadmin", superadmin_routes(state.clone()))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let security = &config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, content, health, subscribe};

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Token acquisition
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/superadmin/login", post(auth::superadmin_login))
        .route("/auth/password/forgot", post(auth::forgot_password))
        .route("/auth/password/reset", post(auth::reset_password))
        // Newsletter
        .route("/subscribe", post(subscribe::subscribe))
        .route("/subscribe/confirm", get(subscribe::confirm))
        .route("/subscribe/unsubscribe", get(subscribe::unsubscribe))
        // Listings
        .route("/organizations", get(content::organizations))
        .route("/organizations/:acronym", get(content::organization))
        .route("/programs", get(content::programs))
        .route("/programs/:id", get(content::program))
        .route("/programs/:id/volunteers", post(content::apply))
        .route("/news", get(content::news))
        .route("/highlights", get(content::highlights))
}

// Layers run bottom-up: the token is checked before the account lookup
fn admin_routes(state: AppState) -> Router<AppState> {
    use protected::{account, content, notifications, submissions};

    Router::new()
        .route("/me", get(account::me))
        .route("/password", put(account::change_password))
        .route("/email-change/request", post(account::request_email_change))
        .route("/email-change/verify", post(account::verify_email_change))
        .route("/organization", get(account::organization))
        .route("/submissions", get(submissions::list).post(submissions::create))
        .route("/submissions/:id", get(submissions::get))
        .route("/submissions/:id/cancel", put(submissions::cancel))
        .route("/programs", get(content::programs))
        .route("/programs/:id", delete(content::delete_program))
        .route("/volunteers", get(content::volunteers))
        .route("/volunteers/:id/status", put(content::volunteer_status))
        .route("/news", get(content::news).post(content::create_news))
        .route(
            "/news/:id",
            get(content::news_item)
                .put(content::update_news)
                .delete(content::delete_news),
        )
        .route("/highlights", get(content::highlights).post(content::create_highlight))
        .route(
            "/highlights/:id",
            get(content::highlight)
                .put(content::update_highlight)
                .delete(content::delete_highlight),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route_layer(from_fn_with_state(state, require_admin))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn superadmin_routes(state: AppState) -> Router<AppState> {
    use elevated::{account, management, notifications, submissions};

    Router::new()
        .route("/me", get(account::me))
        .route("/password", put(account::change_password))
        .route("/email-change/request", post(account::request_email_change))
        .route("/email-change/verify", post(account::verify_email_change))
        .route("/admins", get(management::admins).post(management::create_admin))
        .route("/admins/:id", delete(management::delete_admin))
        .route("/admins/:id/status", put(management::admin_status))
        .route("/organizations", get(management::organizations))
        .route("/organizations/:id", delete(management::delete_organization))
        .route("/organizations/:id/status", put(management::organization_status))
        .route("/subscribers", get(management::subscribers))
        .route("/subscribers/:id", delete(management::delete_subscriber))
        .route("/submissions", get(submissions::list))
        .route("/submissions/:id", get(submissions::get))
        .route("/submissions/:id/approve", put(submissions::approve))
        .route("/submissions/:id/reject", put(submissions::reject))
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route_layer(from_fn_with_state(state, require_superadmin))
        .route_layer(from_fn(jwt_auth_middleware))
}
