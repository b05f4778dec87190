use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::{LineOutcome, LineRequest, LineStatus, OrderView, Placement};
use crate::errors::AppError;
use crate::handlers::customers::CustomerResponse;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub customer_id: i32,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineOutcomeResponse {
    pub product_id: i32,
    pub quantity: i32,
    /// One of `placed`, `product_not_found`, `insufficient_stock`,
    /// `invalid_quantity`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,
    /// Stock left when the line failed for lack of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: i32,
    pub order_date: String,
    pub fulfilled: usize,
    pub lines: Vec<LineOutcomeResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub subtotal: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_id: i32,
    pub order_date: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<LineOutcome> for LineOutcomeResponse {
    fn from(line: LineOutcome) -> Self {
        let (status, subtotal, available) = match line.status {
            LineStatus::Placed { subtotal } => ("placed", Some(subtotal.to_string()), None),
            LineStatus::ProductNotFound => ("product_not_found", None, None),
            LineStatus::InsufficientStock { available } => {
                ("insufficient_stock", None, Some(available))
            }
            LineStatus::InvalidQuantity => ("invalid_quantity", None, None),
        };
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            status: status.to_string(),
            subtotal,
            available,
        }
    }
}

impl From<Placement> for PlaceOrderResponse {
    fn from(p: Placement) -> Self {
        let fulfilled = p.lines.iter().filter(|l| l.status.is_placed()).count();
        Self {
            order_id: p.order_id,
            order_date: p.order_date.to_string(),
            fulfilled,
            lines: p.lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            customer_id: o.customer_id,
            order_date: o.order_date.to_string(),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    subtotal: i.subtotal.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order. Every line is checked against current stock on its own;
/// lines that cannot be fulfilled are reported but do not stop the others.
/// The order is stored even when no line could be fulfilled.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed; per-line outcome in body", body = PlaceOrderResponse),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let lines: Vec<LineRequest> = body
        .items
        .into_iter()
        .map(|l| LineRequest {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();

    let placement =
        web::block(move || state.orders.place_order(body.customer_id, lines)).await??;

    Ok(HttpResponse::Created().json(PlaceOrderResponse::from(placement)))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(order_id)).await??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound("Order")),
    }
}

/// GET /orders
///
/// Returns a page of orders in id order. Use `page` (1-based) and `limit`.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let result =
        web::block(move || state.orders.list_orders(params.page, params.limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page: result.page,
        limit: result.limit,
    }))
}

/// DELETE /orders/{id}
///
/// Deletes the order and all of its items.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 204, description = "Order and items deleted"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || state.orders.delete_order(order_id)).await??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /orders/{id}/customer
#[utoipa::path(
    get,
    path = "/orders/{id}/customer",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Customer who placed the order", body = CustomerResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order_customer(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let customer = web::block(move || state.orders.customer_of(order_id)).await??;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}
