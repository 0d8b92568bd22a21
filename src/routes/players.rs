use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::sqlite::SqlitePool;
use crate::models::{Player, PlayerPatch, PlayerPayload, Upserted};
use crate::error::{ApiError, ErrorResponse};
use crate::db;

fn location(player: &Player) -> String {
    format!("/api/players/{}", player.player_id)
}

fn created(player: Player) -> Response {
    let location = location(&player);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(player)).into_response()
}

// GET /api/players - List players that are not soft-deleted
#[utoipa::path(
    get,
    path = "/api/players",
    tag = "Player",
    responses((status = 200, description = "Players that are not soft-deleted", body = [Player]))
)]
pub async fn get_players(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = db::get_active_players(&pool).await?;

    Ok(Json(players))
}

// GET /api/players/{id} - Get player by ID, deleted or not
#[utoipa::path(
    get,
    path = "/api/players/{id}",
    tag = "Player",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player, including soft-deleted ones", body = Player),
        (status = 404, description = "No such player", body = ErrorResponse)
    )
)]
pub async fn get_player_by_id(
    State(pool): State<SqlitePool>,
    Path(player_id): Path<i64>,
) -> Result<Json<Player>, ApiError> {
    let player = db::get_player_by_id(&pool, player_id)
        .await?
        .ok_or(ApiError::not_found("Player", player_id))?;

    Ok(Json(player))
}

// POST /api/players - Create player with a fresh id
#[utoipa::path(
    post,
    path = "/api/players",
    tag = "Player",
    request_body = PlayerPayload,
    responses((status = 201, description = "Player created", body = Player,
        headers(("location" = String, description = "Path of the new player"))))
)]
pub async fn create_player(
    State(pool): State<SqlitePool>,
    Json(payload): Json<PlayerPayload>,
) -> Result<Response, ApiError> {
    let player = db::insert_player(&pool, &payload).await?;
    tracing::info!(player_id = player.player_id, "Player created");

    Ok(created(player))
}

// PUT /api/players/{id} - Update player, or insert it under this id
#[utoipa::path(
    put,
    path = "/api/players/{id}",
    tag = "Player",
    params(("id" = i64, Path, description = "Player id")),
    request_body = PlayerPayload,
    responses(
        (status = 200, description = "Existing player overwritten", body = Player),
        (status = 201, description = "Player inserted under the path id", body = Player,
            headers(("location" = String, description = "Path of the new player")))
    )
)]
pub async fn upsert_player(
    State(pool): State<SqlitePool>,
    Path(player_id): Path<i64>,
    Json(payload): Json<PlayerPayload>,
) -> Result<Response, ApiError> {
    let mut tx = pool.begin().await?;
    let (player, branch) = db::upsert_player(&mut tx, player_id, &payload).await?;
    tx.commit().await?;

    tracing::info!(player_id, ?branch, "Player upserted");

    Ok(match branch {
        Upserted::Updated => Json(player).into_response(),
        Upserted::Inserted => created(player),
    })
}

// PATCH /api/players/{id} - Change the given fields of an existing player
#[utoipa::path(
    patch,
    path = "/api/players/{id}",
    tag = "Player",
    params(("id" = i64, Path, description = "Player id")),
    request_body = PlayerPatch,
    responses(
        (status = 200, description = "Player updated", body = Player),
        (status = 404, description = "No such player", body = ErrorResponse)
    )
)]
pub async fn update_player(
    State(pool): State<SqlitePool>,
    Path(player_id): Path<i64>,
    Json(patch): Json<PlayerPatch>,
) -> Result<Json<Player>, ApiError> {
    let player = db::patch_player(&pool, player_id, &patch)
        .await?
        .ok_or(ApiError::not_found("Player", player_id))?;

    Ok(Json(player))
}

// DELETE /api/players/{id} - Soft delete
#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    tag = "Player",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 204, description = "Player marked deleted"),
        (status = 404, description = "No such player", body = ErrorResponse)
    )
)]
pub async fn delete_player(
    State(pool): State<SqlitePool>,
    Path(player_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !db::soft_delete_player(&pool, player_id).await? {
        return Err(ApiError::not_found("Player", player_id));
    }

    tracing::info!(player_id, "Player soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
