//! Buyer handlers: catalog, ordering and cancellation

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::{CreateOrderRequest, PriceRequest, PriceResponse};
use crate::application::marketplace::BuyerService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::dto::{to_dtos, OrderDto, ProductDto};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BuyerHandlerState {
    pub buyer_service: Arc<BuyerService>,
}

#[utoipa::path(
    get,
    path = "/api/buyer/products",
    tag = "Buyer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Products in stock", body = ApiResponse<Vec<ProductDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_all_products(
    State(state): State<BuyerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    info!(user = %user.email, "Products requested");
    let products = state
        .buyer_service
        .get_all_products(user.user_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, count = products.len(), "Products returned");
    Ok(Json(ApiResponse::success(to_dtos(products))))
}

#[utoipa::path(
    get,
    path = "/api/buyer/orders",
    tag = "Buyer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's open and delivered orders", body = ApiResponse<Vec<OrderDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_my_orders(
    State(state): State<BuyerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    info!(user = %user.email, "Own orders requested");
    let orders = state
        .buyer_service
        .get_my_orders(user.user_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, count = orders.len(), "Own orders returned");
    Ok(Json(ApiResponse::success(to_dtos(orders))))
}

#[utoipa::path(
    post,
    path = "/api/buyer/create-order",
    tag = "Buyer",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderDto>),
        (status = 400, description = "Order rejected"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn create_order(
    State(state): State<BuyerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDto>>), ApiError> {
    info!(user = %user.email, lines = request.items.len(), "Order creation requested");

    let order = state
        .buyer_service
        .create_order(user.user_id, request.into())
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, order_id = order.id, "Order creation completed");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order.into()))))
}

#[utoipa::path(
    post,
    path = "/api/buyer/decline-order/{id}",
    tag = "Buyer",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order canceled", body = ApiResponse<EmptyData>),
        (status = 400, description = "Order can no longer be canceled"),
        (status = 404, description = "Order not found for this buyer")
    )
)]
pub async fn decline_order(
    State(state): State<BuyerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(order_id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    info!(user = %user.email, order_id, "Order cancellation requested");

    state
        .buyer_service
        .decline_order(user.user_id, order_id)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, order_id, "Order cancellation completed");
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    post,
    path = "/api/buyer/price",
    tag = "Buyer",
    security(("bearer_auth" = [])),
    request_body = PriceRequest,
    responses(
        (status = 200, description = "Total including delivery fees", body = ApiResponse<PriceResponse>),
        (status = 400, description = "Invalid lines"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_total_price(
    State(state): State<BuyerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<PriceRequest>,
) -> Result<Json<ApiResponse<PriceResponse>>, ApiError> {
    info!(user = %user.email, lines = request.items.len(), "Price requested");

    let total = state
        .buyer_service
        .get_total_price(user.user_id, &request.lines())
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, total = %total, "Price returned");
    Ok(Json(ApiResponse::success(PriceResponse {
        total_price: total.to_decimal(),
    })))
}
