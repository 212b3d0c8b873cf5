//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::EmptyData;
use super::dto::{OrderDto, OrderItemDto, ProductDto, UserDto};
use super::middleware::{auth_middleware, require_role, AuthState};
use super::modules::{admin, auth, buyer, health, metrics, seller, users};
use crate::application::identity::{AuthService, ProfileService};
use crate::application::marketplace::{AdminService, BuyerService, SellerService};
use crate::domain::{RepositoryProvider, UserType};
use crate::infrastructure::crypto::jwt::JwtConfig;

/// Everything the HTTP layer needs from the rest of the service
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
    pub buyer_service: Arc<BuyerService>,
    pub seller_service: Arc<SellerService>,
    pub admin_service: Arc<AdminService>,
    pub jwt_config: JwtConfig,
    pub prometheus: PrometheusHandle,
    /// Request body cap, applies to image uploads
    pub max_upload_bytes: usize,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::register_via_google,
        // Admin
        admin::get_verified_users,
        admin::get_unverified_users,
        admin::get_declined_users,
        admin::get_buyers,
        admin::verify_user,
        admin::get_all_orders,
        // Buyer
        buyer::get_all_products,
        buyer::get_my_orders,
        buyer::create_order,
        buyer::decline_order,
        buyer::get_total_price,
        // Seller
        seller::get_all_products,
        seller::get_product,
        seller::create_product,
        seller::update_product,
        seller::delete_product,
        seller::get_all_orders,
        seller::get_new_orders,
        seller::accept_order,
        // User
        users::get_profile,
        users::edit_profile,
        users::add_picture,
    ),
    components(
        schemas(
            EmptyData,
            UserDto,
            ProductDto,
            OrderDto,
            OrderItemDto,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::GoogleLoginRequest,
            admin::VerifyUserRequest,
            buyer::OrderLineRequest,
            buyer::CreateOrderRequest,
            buyer::PriceRequest,
            buyer::PriceResponse,
            seller::ProductFormSchema,
            users::UpdateProfileRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Authentication", description = "Login, registration and Google sign-in"),
        (name = "Admin", description = "Seller verification, buyers and all orders"),
        (name = "Buyer", description = "Catalog, ordering and cancellation"),
        (name = "Seller", description = "Product management and order acceptance"),
        (name = "User", description = "Profile of the signed-in user"),
    ),
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "REST API of an online marketplace for buyers, sellers and administrators"
    )
)]
pub struct ApiDoc;

/// Wraps `router` in bearer authentication and, if given, a role guard.
fn protect(router: Router, role: Option<UserType>, auth_state: &AuthState) -> Router {
    let router = match role {
        Some(role) => router.layer(middleware::from_fn_with_state(role, require_role)),
        None => router,
    };
    router.layer(middleware::from_fn_with_state(
        auth_state.clone(),
        auth_middleware,
    ))
}

/// Create the API router
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/register-via-google", post(auth::register_via_google))
        .with_state(auth::AuthHandlerState {
            auth_service: ctx.auth_service.clone(),
        });

    let admin_routes = Router::new()
        .route("/verified-users", get(admin::get_verified_users))
        .route("/unverified-users", get(admin::get_unverified_users))
        .route("/declined-users", get(admin::get_declined_users))
        .route("/buyers", get(admin::get_buyers))
        .route("/verify-user", post(admin::verify_user))
        .route("/orders", get(admin::get_all_orders))
        .with_state(admin::AdminHandlerState {
            admin_service: ctx.admin_service.clone(),
        });

    let buyer_routes = Router::new()
        .route("/products", get(buyer::get_all_products))
        .route("/orders", get(buyer::get_my_orders))
        .route("/create-order", post(buyer::create_order))
        .route("/decline-order/{id}", post(buyer::decline_order))
        .route("/price", post(buyer::get_total_price))
        .with_state(buyer::BuyerHandlerState {
            buyer_service: ctx.buyer_service.clone(),
        });

    let seller_routes = Router::new()
        .route(
            "/products",
            get(seller::get_all_products).post(seller::create_product),
        )
        .route(
            "/products/{id}",
            get(seller::get_product)
                .put(seller::update_product)
                .delete(seller::delete_product),
        )
        .route("/orders", get(seller::get_all_orders))
        .route("/new-orders", get(seller::get_new_orders))
        .route("/accept-order/{id}", post(seller::accept_order))
        .with_state(seller::SellerHandlerState {
            seller_service: ctx.seller_service.clone(),
        });

    let user_routes = Router::new()
        .route("/", get(users::get_profile).put(users::edit_profile))
        .route("/add-picture", put(users::add_picture))
        .with_state(users::UserHandlerState {
            profile_service: ctx.profile_service.clone(),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            repos: ctx.repos.clone(),
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: ctx.prometheus.clone(),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/auth", auth_routes)
        .nest(
            "/api/admin",
            protect(admin_routes, Some(UserType::Admin), &auth_state),
        )
        .nest(
            "/api/buyer",
            protect(buyer_routes, Some(UserType::Buyer), &auth_state),
        )
        .nest(
            "/api/seller",
            protect(seller_routes, Some(UserType::Seller), &auth_state),
        )
        .nest("/api/user", protect(user_routes, None, &auth_state))
        // Middleware
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(DefaultBodyLimit::max(ctx.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
