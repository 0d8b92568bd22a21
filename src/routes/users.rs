use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use crate::models::{User, UserPatch, UserPayload};
use crate::error::{ApiError, ErrorResponse};
use crate::db;

fn created(user: User) -> Response {
    let location = format!("/api/users/{}", user.user_id);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(user)).into_response()
}

/// A user may only point at a role that exists.
async fn require_role(conn: &mut SqliteConnection, role_id: i64) -> Result<(), ApiError> {
    db::get_role_by_id(&mut *conn, role_id)
        .await?
        .ok_or(ApiError::not_found("Role", role_id))?;
    Ok(())
}

fn role_for_new_user(payload: &UserPayload) -> Result<i64, ApiError> {
    payload
        .role_id
        .ok_or_else(|| ApiError::Validation("role_id is required to create a user".to_string()))
}

async fn insert_with_role(
    pool: &SqlitePool,
    role_id: i64,
    payload: &UserPayload,
) -> Result<User, ApiError> {
    let mut tx = pool.begin().await?;
    require_role(&mut tx, role_id).await?;
    let user = db::insert_user(&mut *tx, payload, role_id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.user_id, role_id, "User created");
    Ok(user)
}

// GET /api/users - List users that are not soft-deleted
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "User",
    responses((status = 200, description = "Users that are not soft-deleted", body = [User]))
)]
pub async fn get_users(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = db::get_active_users(&pool).await?;

    Ok(Json(users))
}

// GET /api/users/{id} - Get user by ID, deleted or not
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User, including soft-deleted ones", body = User),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn get_user_by_id(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = db::get_user_by_id(&pool, user_id)
        .await?
        .ok_or(ApiError::not_found("User", user_id))?;

    Ok(Json(user))
}

// POST /api/users - Create user, role taken from the body
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "User",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User,
            headers(("location" = String, description = "Path of the new user"))),
        (status = 404, description = "Unknown role", body = ErrorResponse),
        (status = 422, description = "role_id missing", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<UserPayload>,
) -> Result<Response, ApiError> {
    let role_id = role_for_new_user(&payload)?;
    let user = insert_with_role(&pool, role_id, &payload).await?;

    Ok(created(user))
}

// POST /api/users/{role_id} - Create user with the role from the path
#[utoipa::path(
    post,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = i64, Path, description = "Role id assigned to the new user")),
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User,
            headers(("location" = String, description = "Path of the new user"))),
        (status = 404, description = "Unknown role", body = ErrorResponse)
    )
)]
pub async fn create_user_with_role(
    State(pool): State<SqlitePool>,
    Path(role_id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Response, ApiError> {
    let user = insert_with_role(&pool, role_id, &payload).await?;

    Ok(created(user))
}

// PUT /api/users/{id} - Update user, or insert it under this id
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Existing user overwritten", body = User),
        (status = 201, description = "User inserted under the path id", body = User,
            headers(("location" = String, description = "Path of the new user"))),
        (status = 404, description = "Unknown role", body = ErrorResponse),
        (status = 422, description = "role_id missing for a new user", body = ErrorResponse)
    )
)]
pub async fn upsert_user(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Result<Response, ApiError> {
    let mut tx = pool.begin().await?;

    if let Some(role_id) = payload.role_id {
        require_role(&mut tx, role_id).await?;
    }

    if let Some(user) = db::update_user(&mut *tx, user_id, &payload).await? {
        tx.commit().await?;
        tracing::info!(user_id, "User updated");
        return Ok(Json(user).into_response());
    }

    let role_id = role_for_new_user(&payload)?;
    let user = db::insert_user_with_id(&mut *tx, user_id, &payload, role_id).await?;
    tx.commit().await?;

    tracing::info!(user_id, role_id, "User inserted by upsert");
    Ok(created(user))
}

// PATCH /api/users/{id} - Change the given fields of an existing user
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "No such user or role", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let mut tx = pool.begin().await?;

    if let Some(role_id) = patch.role_id {
        require_role(&mut tx, role_id).await?;
    }

    let user = db::patch_user(&mut *tx, user_id, &patch)
        .await?
        .ok_or(ApiError::not_found("User", user_id))?;
    tx.commit().await?;

    Ok(Json(user))
}

// DELETE /api/users/{id} - Soft delete
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "User",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User marked deleted"),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !db::soft_delete_user(&pool, user_id).await? {
        return Err(ApiError::not_found("User", user_id));
    }

    tracing::info!(user_id, "User soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::routes::test_support::{app, get, send};

    // Seeded by the initial migration.
    const ADMIN_ROLE: i64 = 1;
    const PLAYER_ROLE: i64 = 2;

    fn marek() -> Value {
        json!({
            "name": "Marek",
            "surname": "Kowalski",
            "email": "marek@example.com",
            "phone": "555-0199"
        })
    }

    #[tokio::test]
    async fn create_with_role_in_path() {
        let app = app().await;

        let created = send(&app, Method::POST, &format!("/api/users/{ADMIN_ROLE}"), Some(marek())).await;

        assert_eq!(created.status, StatusCode::CREATED);
        let id = created.body["user_id"].as_i64().unwrap();
        assert_eq!(created.location(), Some(format!("/api/users/{id}").as_str()));
        assert_eq!(created.body["role_id"], json!(ADMIN_ROLE));
        assert_eq!(created.body["is_deleted"], json!(0));

        let fetched = get(&app, &format!("/api/users/{id}")).await;
        assert_eq!(fetched.body, created.body);
    }

    #[tokio::test]
    async fn path_role_wins_over_body_role() {
        let app = app().await;
        let mut body = marek();
        body["role_id"] = json!(ADMIN_ROLE);

        let created = send(&app, Method::POST, &format!("/api/users/{PLAYER_ROLE}"), Some(body)).await;

        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["role_id"], json!(PLAYER_ROLE));
    }

    #[tokio::test]
    async fn unknown_role_is_not_found_and_persists_nothing() {
        let app = app().await;

        let response = send(&app, Method::POST, "/api/users/999999", Some(marek())).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], "Role 999999 not found");
        assert!(get(&app, "/api/users").await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_role_in_body() {
        let app = app().await;
        let mut body = marek();
        body["role_id"] = json!(PLAYER_ROLE);

        let created = send(&app, Method::POST, "/api/users", Some(body)).await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["role_id"], json!(PLAYER_ROLE));

        let missing_role = send(&app, Method::POST, "/api/users", Some(marek())).await;
        assert_eq!(missing_role.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_keeps_user_readable_by_id() {
        let app = app().await;
        let created = send(&app, Method::POST, &format!("/api/users/{ADMIN_ROLE}"), Some(marek())).await;
        let id = created.body["user_id"].as_i64().unwrap();

        let deleted = send(&app, Method::DELETE, &format!("/api/users/{id}"), None).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let fetched = get(&app, &format!("/api/users/{id}")).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body["is_deleted"], json!(1));
        assert!(get(&app, "/api/users").await.body.as_array().unwrap().is_empty());

        let missing = send(&app, Method::DELETE, "/api/users/31337", None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_upserts_and_validates_role() {
        let app = app().await;

        let no_role = send(&app, Method::PUT, "/api/users/70", Some(marek())).await;
        assert_eq!(no_role.status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut body = marek();
        body["role_id"] = json!(42);
        let bad_role = send(&app, Method::PUT, "/api/users/70", Some(body.clone())).await;
        assert_eq!(bad_role.status, StatusCode::NOT_FOUND);
        assert_eq!(get(&app, "/api/users/70").await.status, StatusCode::NOT_FOUND);

        body["role_id"] = json!(PLAYER_ROLE);
        let inserted = send(&app, Method::PUT, "/api/users/70", Some(body)).await;
        assert_eq!(inserted.status, StatusCode::CREATED);
        assert_eq!(inserted.location(), Some("/api/users/70"));

        // Role omitted on update: the existing one is kept.
        let mut renamed = marek();
        renamed["name"] = json!("Mark");
        let updated = send(&app, Method::PUT, "/api/users/70", Some(renamed)).await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["name"], "Mark");
        assert_eq!(updated.body["role_id"], json!(PLAYER_ROLE));

        assert_eq!(get(&app, "/api/users").await.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_still_works_after_put_with_largest_id() {
        let app = app().await;
        let mut body = marek();
        body["role_id"] = json!(PLAYER_ROLE);

        let inserted = send(&app, Method::PUT, &format!("/api/users/{}", i64::MAX), Some(body)).await;
        assert_eq!(inserted.status, StatusCode::CREATED);

        let created = send(&app, Method::POST, &format!("/api/users/{ADMIN_ROLE}"), Some(marek())).await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_ne!(created.body["user_id"].as_i64().unwrap(), i64::MAX);
    }

    #[tokio::test]
    async fn patch_changes_role_of_existing_user_only() {
        let app = app().await;

        let missing = send(&app, Method::PATCH, "/api/users/5", Some(marek())).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let created = send(&app, Method::POST, &format!("/api/users/{PLAYER_ROLE}"), Some(marek())).await;
        let id = created.body["user_id"].as_i64().unwrap();

        let mut body = marek();
        body["role_id"] = json!(ADMIN_ROLE);
        let patched = send(&app, Method::PATCH, &format!("/api/users/{id}"), Some(body.clone())).await;
        assert_eq!(patched.status, StatusCode::OK);
        assert_eq!(patched.body["role_id"], json!(ADMIN_ROLE));

        let renamed = send(&app, Method::PATCH, &format!("/api/users/{id}"), Some(json!({"name": "Marian"}))).await;
        assert_eq!(renamed.status, StatusCode::OK);
        assert_eq!(renamed.body["name"], "Marian");
        assert_eq!(renamed.body["surname"], "Kowalski");
        assert_eq!(renamed.body["email"], "marek@example.com");
        assert_eq!(renamed.body["phone"], "555-0199");
        assert_eq!(renamed.body["role_id"], json!(ADMIN_ROLE));

        body["role_id"] = json!(1000);
        let bad_role = send(&app, Method::PATCH, &format!("/api/users/{id}"), Some(body)).await;
        assert_eq!(bad_role.status, StatusCode::NOT_FOUND);
        assert_eq!(get(&app, &format!("/api/users/{id}")).await.body["role_id"], json!(ADMIN_ROLE));
    }
}
