use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{NewProduct, Product};
use crate::errors::AppError;
use crate::handlers::parse_decimal;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Decimal price as a string, e.g. "999.99"
    pub price: String,
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub stock_quantity: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price.to_string(),
            stock_quantity: p.stock_quantity,
        }
    }
}

fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(Into::into).collect()
}

/// GET /products
///
/// Every product with its stock level, in id order.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.catalog.list_products()).await??;

    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_product = NewProduct {
        price: parse_decimal("price", &body.price)?,
        name: body.name,
        stock_quantity: body.stock_quantity,
    };

    let product = web::block(move || state.catalog.add_product(new_product)).await??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products/search?name=
///
/// Case-insensitive substring search on the product name.
#[utoipa::path(
    get,
    path = "/products/search",
    params(
        ("name" = String, Query, description = "Fragment of the product name"),
    ),
    responses(
        (status = 200, description = "Matching products, possibly none", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn search_products(
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let name = query.into_inner().name;

    let products = web::block(move || state.catalog.search_products(&name)).await??;

    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /products/by-name/{name}
///
/// Exact, case-insensitive name match.
#[utoipa::path(
    get,
    path = "/products/by-name/{name}",
    params(
        ("name" = String, Path, description = "Product name"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product_by_name(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();

    let product = web::block(move || state.catalog.find_by_name(&name)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let product = web::block(move || state.catalog.get_product(id)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}/stock
#[utoipa::path(
    put,
    path = "/products/{id}/stock",
    params(
        ("id" = i32, Path, description = "Product id"),
    ),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ProductResponse),
        (status = 400, description = "Negative stock"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_stock(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateStockRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let stock = body.into_inner().stock_quantity;

    let product = web::block(move || state.catalog.set_stock(id, stock)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
