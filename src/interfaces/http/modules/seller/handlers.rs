//! Seller handlers: catalog management and order acceptance

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use super::dto::{product_form, ProductFormSchema};
use crate::application::marketplace::SellerService;
use crate::interfaces::http::common::multipart::read_form;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData};
use crate::interfaces::http::dto::{to_dtos, OrderDto, ProductDto};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct SellerHandlerState {
    pub seller_service: Arc<SellerService>,
}

#[utoipa::path(
    get,
    path = "/api/seller/products",
    tag = "Seller",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's products", body = ApiResponse<Vec<ProductDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_all_products(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    info!(user = %user.email, "Own products requested");
    let products = state
        .seller_service
        .get_all_products(user.user_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, count = products.len(), "Own products returned");
    Ok(Json(ApiResponse::success(to_dtos(products))))
}

#[utoipa::path(
    get,
    path = "/api/seller/products/{id}",
    tag = "Seller",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductDto>),
        (status = 404, description = "Not one of the caller's products")
    )
)]
pub async fn get_product(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    info!(user = %user.email, product_id, "Product requested");
    let product = state
        .seller_service
        .get_product(user.user_id, product_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, product_id, "Product returned");
    Ok(Json(ApiResponse::success(product.into())))
}

#[utoipa::path(
    post,
    path = "/api/seller/products",
    tag = "Seller",
    security(("bearer_auth" = [])),
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductDto>),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_product(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    info!(user = %user.email, "Product creation requested");

    let form = product_form(read_form(multipart).await?)?;
    let product = state
        .seller_service
        .create_product(user.user_id, form)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, product_id = product.id, "Product creation completed");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product.into()))))
}

#[utoipa::path(
    put,
    path = "/api/seller/products/{id}",
    tag = "Seller",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not one of the caller's products")
    )
)]
pub async fn update_product(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    info!(user = %user.email, product_id, "Product update requested");

    let form = product_form(read_form(multipart).await?)?;
    let product = state
        .seller_service
        .update_product(user.user_id, product_id, form)
        .await
        .map_err(domain_error)?;

    info!(user = %user.email, product_id, "Product update completed");
    Ok(Json(ApiResponse::success(product.into())))
}

#[utoipa::path(
    delete,
    path = "/api/seller/products/{id}",
    tag = "Seller",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not one of the caller's products")
    )
)]
pub async fn delete_product(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    info!(user = %user.email, product_id, "Product deletion requested");
    state
        .seller_service
        .delete_product(user.user_id, product_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, product_id, "Product deletion completed");
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/seller/orders",
    tag = "Seller",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Delivered orders with the caller's products", body = ApiResponse<Vec<OrderDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_all_orders(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    info!(user = %user.email, "Delivered orders requested");
    let orders = state
        .seller_service
        .get_all_orders(user.user_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, count = orders.len(), "Delivered orders returned");
    Ok(Json(ApiResponse::success(to_dtos(orders))))
}

#[utoipa::path(
    get,
    path = "/api/seller/new-orders",
    tag = "Seller",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders in preparation with the caller's products", body = ApiResponse<Vec<OrderDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_new_orders(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    info!(user = %user.email, "New orders requested");
    let orders = state
        .seller_service
        .get_new_orders(user.user_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, count = orders.len(), "New orders returned");
    Ok(Json(ApiResponse::success(to_dtos(orders))))
}

#[utoipa::path(
    post,
    path = "/api/seller/accept-order/{id}",
    tag = "Seller",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order accepted", body = ApiResponse<OrderDto>),
        (status = 400, description = "Order not acceptable by the caller")
    )
)]
pub async fn accept_order(
    State(state): State<SellerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(order_id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    info!(user = %user.email, order_id, "Order acceptance requested");
    let order = state
        .seller_service
        .accept_order(user.user_id, order_id)
        .await
        .map_err(domain_error)?;
    info!(user = %user.email, order_id, "Order acceptance completed");
    Ok(Json(ApiResponse::success(order.into())))
}
