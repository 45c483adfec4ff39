use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::models::{CreateUserRequest, DeleteUserResponse, ListUsersQuery, UpdateUserRequest, UserId, UserPatch};
use crate::routes::{errors::ApiError, matches::AppState};

/// Configure user CRUD routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/users", web::post().to(create_user))
        .route("/users", web::get().to(list_users))
        .route("/users/{user_id}", web::get().to(get_user))
        .route("/users/{user_id}", web::put().to(update_user))
        .route("/users/{user_id}", web::patch().to(update_user))
        .route("/users/{user_id}", web::delete().to(delete_user));
}

const PAIRED_COORDINATES: &str = "latitude and longitude must be provided together";

/// Create a user
///
/// POST /api/v1/users
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    if !req.has_paired_coordinates() {
        return Err(ApiError::Validation(PAIRED_COORDINATES.to_string()));
    }

    let new_user = req
        .into_inner()
        .into_new_user(state.default_weights, state.default_max_distance_km);
    let user = state.store.create_user(new_user).await?;

    tracing::info!("Created user {}", user.id);
    Ok(HttpResponse::Created().json(user))
}

/// List users
///
/// GET /api/v1/users?skip=0&limit=10
async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let users = state.store.list_users(query.skip, query.limit).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Fetch one user
///
/// GET /api/v1/users/{user_id}
async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    match state.store.get_user(user_id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(ApiError::UserNotFound(user_id)),
    }
}

/// Partially update a user
///
/// PUT|PATCH /api/v1/users/{user_id}
///
/// Only fields present in the body are written. Listed interests are added
/// to the user's existing ones.
async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    if !req.has_paired_coordinates() {
        return Err(ApiError::Validation(PAIRED_COORDINATES.to_string()));
    }

    let user_id = path.into_inner();
    let patch = UserPatch::from(req.into_inner());

    match state.store.update_user(user_id, &patch).await? {
        Some(user) => {
            tracing::info!("Updated user {}", user_id);
            Ok(HttpResponse::Ok().json(user))
        }
        None => Err(ApiError::UserNotFound(user_id)),
    }
}

/// Delete a user and their interests
///
/// DELETE /api/v1/users/{user_id}
async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    if !state.store.delete_user(user_id).await? {
        return Err(ApiError::UserNotFound(user_id));
    }

    tracing::info!("Deleted user {}", user_id);
    Ok(HttpResponse::Ok().json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
    }))
}
