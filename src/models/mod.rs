use serde::{Serialize, Deserialize};
use utoipa::ToSchema;

/// Lifecycle of a soft-deletable row. Stored and serialized as the integer 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i64", try_from = "i64")]
#[repr(i64)]
pub enum RecordStatus {
    #[default]
    Active = 0,
    Deleted = 1,
}

impl From<RecordStatus> for i64 {
    fn from(status: RecordStatus) -> Self {
        status as i64
    }
}

impl TryFrom<i64> for RecordStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RecordStatus::Active),
            1 => Ok(RecordStatus::Deleted),
            other => Err(format!("invalid record status {other}, expected 0 or 1")),
        }
    }
}

/// Player row from the players table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Player {
    pub player_id: i64,
    pub name: String,
    pub surname: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    /// 0 = active, 1 = soft-deleted
    #[schema(value_type = i64, minimum = 0, maximum = 1)]
    pub is_deleted: RecordStatus,
}

/// Player fields accepted on create and upsert. Ids and status in the body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlayerPayload {
    pub name: String,
    pub surname: String,
    pub department: String,
    pub email: String,
    pub phone: String,
}

/// User row from the users table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    /// 0 = active, 1 = soft-deleted
    #[schema(value_type = i64, minimum = 0, maximum = 1)]
    pub is_deleted: RecordStatus,
    pub role_id: i64,
}

/// User fields accepted on create and upsert.
///
/// `role_id` is optional on updates (the role is kept) but required whenever
/// a new user row is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserPayload {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub role_id: Option<i64>,
}

/// Role row from the roles table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RolePayload {
    pub role_name: String,
}

/// Partial player update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial user update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
}

/// Which branch an upsert took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}
