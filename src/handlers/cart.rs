use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{CartLine, PricedItem};
use crate::errors::AppError;
use crate::handlers::parse_decimal;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartLineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartTotalRequest {
    pub items: Vec<CartLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PricedItemRequest {
    pub product_id: i32,
    pub price: String,
    /// Percentage between 0 and 100; defaults to 0.
    pub discount_percentage: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountedTotalRequest {
    pub items: Vec<PricedItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalResponse {
    pub total: String,
}

/// POST /cart/total
///
/// Values the cart with the current catalog prices. Unknown products count
/// as zero.
#[utoipa::path(
    post,
    path = "/cart/total",
    request_body = CartTotalRequest,
    responses(
        (status = 200, description = "Cart total", body = TotalResponse),
        (status = 400, description = "Negative quantity"),
    ),
    tag = "cart"
)]
pub async fn cart_total(
    state: web::Data<AppState>,
    body: web::Json<CartTotalRequest>,
) -> Result<HttpResponse, AppError> {
    let cart: Vec<CartLine> = body
        .into_inner()
        .items
        .into_iter()
        .map(|l| CartLine {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();

    let total = web::block(move || state.catalog.cart_total(&cart)).await??;

    Ok(HttpResponse::Ok().json(TotalResponse {
        total: total.to_string(),
    }))
}

/// POST /cart/discounted-total
///
/// Sums the given prices after their discounts, rounded to cents.
#[utoipa::path(
    post,
    path = "/cart/discounted-total",
    request_body = DiscountedTotalRequest,
    responses(
        (status = 200, description = "Discounted total", body = TotalResponse),
        (status = 400, description = "Invalid price or discount"),
    ),
    tag = "cart"
)]
pub async fn discounted_total(
    state: web::Data<AppState>,
    body: web::Json<DiscountedTotalRequest>,
) -> Result<HttpResponse, AppError> {
    let items = body
        .into_inner()
        .items
        .into_iter()
        .map(|i| {
            Ok(PricedItem {
                product_id: i.product_id,
                price: parse_decimal("price", &i.price)?,
                discount_percentage: parse_decimal(
                    "discount_percentage",
                    i.discount_percentage.as_deref().unwrap_or("0"),
                )?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let total = state.catalog.discounted_total(&items)?;

    Ok(HttpResponse::Ok().json(TotalResponse {
        total: total.to_string(),
    }))
}
