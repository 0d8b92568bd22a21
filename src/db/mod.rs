use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite};
use crate::models::*;

/// Open the pool and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| sqlx::Error::Migrate(Box::new(err)))
}

/// Fresh in-memory database. A single connection that never expires, since
/// every new sqlite::memory: connection would see an empty database.
#[cfg(test)]
pub async fn connect_in_memory() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    pool
}

// Player queries
pub async fn get_active_players<'e, E>(executor: E) -> Result<Vec<Player>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"SELECT * FROM players WHERE is_deleted = ? ORDER BY player_id"#
    )
    .bind(RecordStatus::Active)
    .fetch_all(executor)
    .await
}

pub async fn get_player_by_id<'e, E>(executor: E, player_id: i64) -> Result<Option<Player>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"SELECT * FROM players WHERE player_id = ?"#
    )
    .bind(player_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_player<'e, E>(executor: E, payload: &PlayerPayload) -> Result<Player, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"INSERT INTO players (name, surname, department, email, phone, is_deleted)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.department)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(RecordStatus::Active)
    .fetch_one(executor)
    .await
}

async fn insert_player_with_id<'e, E>(
    executor: E,
    player_id: i64,
    payload: &PlayerPayload,
) -> Result<Player, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"INSERT INTO players (player_id, name, surname, department, email, phone, is_deleted)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
    .bind(player_id)
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.department)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(RecordStatus::Active)
    .fetch_one(executor)
    .await
}

/// Overwrite the editable fields. Id and status are left alone.
pub async fn update_player<'e, E>(
    executor: E,
    player_id: i64,
    payload: &PlayerPayload,
) -> Result<Option<Player>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"UPDATE players
           SET name = ?, surname = ?, department = ?, email = ?, phone = ?
           WHERE player_id = ?
           RETURNING *"#
    )
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.department)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(player_id)
    .fetch_optional(executor)
    .await
}

/// Apply only the fields present in the patch.
pub async fn patch_player<'e, E>(
    executor: E,
    player_id: i64,
    patch: &PlayerPatch,
) -> Result<Option<Player>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Player>(
        r#"UPDATE players
           SET name = COALESCE(?, name),
               surname = COALESCE(?, surname),
               department = COALESCE(?, department),
               email = COALESCE(?, email),
               phone = COALESCE(?, phone)
           WHERE player_id = ?
           RETURNING *"#
    )
    .bind(&patch.name)
    .bind(&patch.surname)
    .bind(&patch.department)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(player_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert_player(
    conn: &mut SqliteConnection,
    player_id: i64,
    payload: &PlayerPayload,
) -> Result<(Player, Upserted), sqlx::Error> {
    if let Some(player) = update_player(&mut *conn, player_id, payload).await? {
        return Ok((player, Upserted::Updated));
    }

    let player = insert_player_with_id(&mut *conn, player_id, payload).await?;
    Ok((player, Upserted::Inserted))
}

/// Flip the soft-delete flag. Returns false when no such player exists.
pub async fn soft_delete_player<'e, E>(executor: E, player_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE players SET is_deleted = ? WHERE player_id = ?"#
    )
    .bind(RecordStatus::Deleted)
    .bind(player_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// User queries
pub async fn get_active_users<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"SELECT * FROM users WHERE is_deleted = ? ORDER BY user_id"#
    )
    .bind(RecordStatus::Active)
    .fetch_all(executor)
    .await
}

pub async fn get_user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"SELECT * FROM users WHERE user_id = ?"#
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_user<'e, E>(
    executor: E,
    payload: &UserPayload,
    role_id: i64,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (name, surname, email, phone, is_deleted, role_id)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(RecordStatus::Active)
    .bind(role_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_user_with_id<'e, E>(
    executor: E,
    user_id: i64,
    payload: &UserPayload,
    role_id: i64,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (user_id, name, surname, email, phone, is_deleted, role_id)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
    .bind(user_id)
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(RecordStatus::Active)
    .bind(role_id)
    .fetch_one(executor)
    .await
}

/// Overwrite the editable fields; the role only changes when the payload names one.
pub async fn update_user<'e, E>(
    executor: E,
    user_id: i64,
    payload: &UserPayload,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"UPDATE users
           SET name = ?, surname = ?, email = ?, phone = ?, role_id = COALESCE(?, role_id)
           WHERE user_id = ?
           RETURNING *"#
    )
    .bind(&payload.name)
    .bind(&payload.surname)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.role_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn patch_user<'e, E>(
    executor: E,
    user_id: i64,
    patch: &UserPatch,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"UPDATE users
           SET name = COALESCE(?, name),
               surname = COALESCE(?, surname),
               email = COALESCE(?, email),
               phone = COALESCE(?, phone),
               role_id = COALESCE(?, role_id)
           WHERE user_id = ?
           RETURNING *"#
    )
    .bind(&patch.name)
    .bind(&patch.surname)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(patch.role_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn soft_delete_user<'e, E>(executor: E, user_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE users SET is_deleted = ? WHERE user_id = ?"#
    )
    .bind(RecordStatus::Deleted)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Role queries
pub async fn get_all_roles<'e, E>(executor: E) -> Result<Vec<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Role>(
        r#"SELECT * FROM roles ORDER BY role_id"#
    )
    .fetch_all(executor)
    .await
}

pub async fn get_role_by_id<'e, E>(executor: E, role_id: i64) -> Result<Option<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Role>(
        r#"SELECT * FROM roles WHERE role_id = ?"#
    )
    .bind(role_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_role<'e, E>(executor: E, role_name: &str) -> Result<Role, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Role>(
        r#"INSERT INTO roles (role_name) VALUES (?) RETURNING *"#
    )
    .bind(role_name)
    .fetch_one(executor)
    .await
}

pub async fn rename_role<'e, E>(
    executor: E,
    role_id: i64,
    role_name: &str,
) -> Result<Option<Role>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Role>(
        r#"UPDATE roles SET role_name = ? WHERE role_id = ? RETURNING *"#
    )
    .bind(role_name)
    .bind(role_id)
    .fetch_optional(executor)
    .await
}

/// Physically remove a role. Fails with a foreign key violation while users reference it.
pub async fn delete_role<'e, E>(executor: E, role_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"DELETE FROM roles WHERE role_id = ?"#
    )
    .bind(role_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
