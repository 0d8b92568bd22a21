use axum::{response::Json, routing::get, Router};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::{Player, PlayerPatch, PlayerPayload, Role, RolePayload, User, UserPatch, UserPayload};

pub mod health;
pub mod players;
pub mod roles;
pub mod users;

#[derive(OpenApi)]
#[openapi(
    info(title = "Table Football League API", version = "1.0.0"),
    paths(
        health::health_check,
        players::get_players,
        players::get_player_by_id,
        players::create_player,
        players::upsert_player,
        players::update_player,
        players::delete_player,
        users::get_users,
        users::get_user_by_id,
        users::create_user,
        users::create_user_with_role,
        users::upsert_user,
        users::update_user,
        users::delete_user,
        roles::get_roles,
        roles::get_role_by_id,
        roles::create_role,
        roles::rename_role,
        roles::delete_role,
    ),
    components(schemas(
        Player, PlayerPayload, PlayerPatch,
        User, UserPayload, UserPatch,
        Role, RolePayload,
        ErrorResponse, health::HealthResponse,
    )),
    tags(
        (name = "Player", description = "Player API"),
        (name = "User", description = "User API"),
        (name = "Role", description = "Role API"),
        (name = "Health", description = "Service status"),
    )
)]
pub struct ApiDoc;

// GET /api-docs/openapi.json - Generated OpenAPI document
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(pool: SqlitePool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Root and health
        .route("/", get(|| async { "Table Football League API - v1.0" }))
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))

        // Player endpoints
        .route("/api/players", get(players::get_players).post(players::create_player))
        .route(
            "/api/players/{id}",
            get(players::get_player_by_id)
                .put(players::upsert_player)
                .patch(players::update_player)
                .delete(players::delete_player),
        )

        // User endpoints. POST on the item path takes a role id, not a user id.
        .route("/api/users", get(users::get_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user_by_id)
                .post(users::create_user_with_role)
                .put(users::upsert_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )

        // Role endpoints
        .route("/api/roles", get(roles::get_roles).post(roles::create_role))
        .route(
            "/api/roles/{id}",
            get(roles::get_role_by_id)
                .put(roles::rename_role)
                .delete(roles::delete_role),
        )

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::test_support::{app, get};

    #[tokio::test]
    async fn serves_openapi_document() {
        let app = app().await;

        let response = get(&app, "/api-docs/openapi.json").await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["info"]["title"], "Table Football League API");

        let paths = &response.body["paths"];
        for path in ["/api/players", "/api/players/{id}", "/api/users", "/api/users/{id}", "/api/roles/{id}", "/health"] {
            assert!(paths.get(path).is_some(), "missing {path}");
        }
        for method in ["get", "post", "put", "patch", "delete"] {
            assert!(paths["/api/users/{id}"].get(method).is_some(), "missing {method}");
        }
        assert!(response.body["components"]["schemas"]["Player"].is_object());
        assert!(response.body["components"]["schemas"]["PlayerPatch"].is_object());
    }
}
