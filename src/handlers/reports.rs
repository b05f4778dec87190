use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductRevenueResponse {
    pub product_id: i32,
    pub product_name: String,
    pub total_revenue: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopSellerResponse {
    pub product_id: i32,
    pub total_quantity_sold: i64,
}

#[derive(Debug, Deserialize)]
pub struct TopSellingParams {
    #[serde(default = "default_top")]
    pub limit: usize,
}

fn default_top() -> usize {
    3
}

/// GET /reports/revenue-by-product
#[utoipa::path(
    get,
    path = "/reports/revenue-by-product",
    responses(
        (status = 200, description = "Revenue per product, in product id order", body = [ProductRevenueResponse]),
    ),
    tag = "reports"
)]
pub async fn revenue_by_product(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || state.orders.revenue_by_product()).await??;

    let body: Vec<ProductRevenueResponse> = rows
        .into_iter()
        .map(|r| ProductRevenueResponse {
            product_id: r.product_id,
            product_name: r.product_name,
            total_revenue: r.total_revenue.with_scale(2).to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /reports/top-selling?limit=
///
/// Best-selling products by quantity. Ties keep the product sold first.
#[utoipa::path(
    get,
    path = "/reports/top-selling",
    params(
        ("limit" = Option<usize>, Query, description = "Number of products (default 3)"),
    ),
    responses(
        (status = 200, description = "Top sellers", body = [TopSellerResponse]),
    ),
    tag = "reports"
)]
pub async fn top_selling(
    state: web::Data<AppState>,
    query: web::Query<TopSellingParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.into_inner().limit;

    let top = web::block(move || state.orders.top_selling(limit)).await??;

    let body: Vec<TopSellerResponse> = top
        .into_iter()
        .map(|t| TopSellerResponse {
            product_id: t.product_id,
            total_quantity_sold: t.total_quantity_sold,
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
