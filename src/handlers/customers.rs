use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{Customer, NewCustomer};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            phone: c.phone,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerRevenueResponse {
    pub customer_id: i32,
    pub total_revenue: String,
}

/// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid customer data"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    state: web::Data<AppState>,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_customer = NewCustomer {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        phone: body.phone,
    };

    let customer = web::block(move || state.catalog.add_customer(new_customer)).await??;

    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(
        ("id" = i32, Path, description = "Customer id"),
    ),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let customer = web::block(move || state.catalog.get_customer(id)).await??;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/// GET /customers/{id}/revenue
///
/// Sum of every order item subtotal across the customer's orders.
#[utoipa::path(
    get,
    path = "/customers/{id}/revenue",
    params(
        ("id" = i32, Path, description = "Customer id"),
    ),
    responses(
        (status = 200, description = "Total revenue", body = CustomerRevenueResponse),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn customer_revenue(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();

    let total = web::block(move || state.orders.revenue_by_customer(customer_id)).await??;

    Ok(HttpResponse::Ok().json(CustomerRevenueResponse {
        customer_id,
        total_revenue: total.with_scale(2).to_string(),
    }))
}
