use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /directory/users
///
/// Relays the external user directory. When the directory cannot be reached
/// the page is empty.
#[utoipa::path(
    get,
    path = "/directory/users",
    responses(
        (status = 200, description = "Users from the external directory"),
    ),
    tag = "directory"
)]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let page = state.directory.all_users().await.unwrap_or_default();

    Ok(HttpResponse::Ok().json(page))
}

/// GET /directory/users/{id}
#[utoipa::path(
    get,
    path = "/directory/users/{id}",
    params(
        ("id" = i64, Path, description = "User id in the directory"),
    ),
    responses(
        (status = 200, description = "User record"),
        (status = 404, description = "User not found or directory unreachable"),
    ),
    tag = "directory"
)]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    match state.directory.user_by_id(path.into_inner()).await {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User")),
    }
}

