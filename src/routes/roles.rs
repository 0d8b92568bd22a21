use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::sqlite::SqlitePool;
use crate::models::{Role, RolePayload};
use crate::error::{ApiError, ErrorResponse};
use crate::db;

fn role_name(payload: &RolePayload) -> Result<&str, ApiError> {
    let name = payload.role_name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("role_name must not be empty".to_string()));
    }
    Ok(name)
}

fn name_taken(name: &str) -> String {
    format!("Role '{}' already exists", name)
}

// GET /api/roles - List all roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Role",
    responses((status = 200, description = "All roles", body = [Role]))
)]
pub async fn get_roles(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Role>>, ApiError> {
    let roles = db::get_all_roles(&pool).await?;

    Ok(Json(roles))
}

// GET /api/roles/{id} - Get role by ID
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Role",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = Role),
        (status = 404, description = "No such role", body = ErrorResponse)
    )
)]
pub async fn get_role_by_id(
    State(pool): State<SqlitePool>,
    Path(role_id): Path<i64>,
) -> Result<Json<Role>, ApiError> {
    let role = db::get_role_by_id(&pool, role_id)
        .await?
        .ok_or(ApiError::not_found("Role", role_id))?;

    Ok(Json(role))
}

// POST /api/roles - Create role
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Role",
    request_body = RolePayload,
    responses(
        (status = 201, description = "Role created", body = Role,
            headers(("location" = String, description = "Path of the new role"))),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Empty name", body = ErrorResponse)
    )
)]
pub async fn create_role(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RolePayload>,
) -> Result<Response, ApiError> {
    let name = role_name(&payload)?;
    let role = db::insert_role(&pool, name)
        .await
        .map_err(|err| ApiError::conflict_on_constraint(err, name_taken(name)))?;

    tracing::info!(role_id = role.role_id, role_name = %role.role_name, "Role created");

    let location = format!("/api/roles/{}", role.role_id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(role)).into_response())
}

// PUT /api/roles/{id} - Rename an existing role
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "Role",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RolePayload,
    responses(
        (status = 200, description = "Role renamed", body = Role),
        (status = 404, description = "No such role", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Empty name", body = ErrorResponse)
    )
)]
pub async fn rename_role(
    State(pool): State<SqlitePool>,
    Path(role_id): Path<i64>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<Role>, ApiError> {
    let name = role_name(&payload)?;
    let role = db::rename_role(&pool, role_id, name)
        .await
        .map_err(|err| ApiError::conflict_on_constraint(err, name_taken(name)))?
        .ok_or(ApiError::not_found("Role", role_id))?;

    Ok(Json(role))
}

// DELETE /api/roles/{id} - Remove a role no user refers to
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Role",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role removed"),
        (status = 404, description = "No such role", body = ErrorResponse),
        (status = 409, description = "Role still assigned to users", body = ErrorResponse)
    )
)]
pub async fn delete_role(
    State(pool): State<SqlitePool>,
    Path(role_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = db::delete_role(&pool, role_id)
        .await
        .map_err(|err| {
            ApiError::conflict_on_constraint(err, format!("Role {} is still assigned to users", role_id))
        })?;

    if !removed {
        return Err(ApiError::not_found("Role", role_id));
    }

    tracing::info!(role_id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}
