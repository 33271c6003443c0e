/*
 * Responsibility
 * - store から返る行の型 (organizations / groups / users / organization_members)
 * - 予約値 (all users group 名) の定義
 */
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Name of the system-managed group every organization member belongs to.
/// It cannot be created, renamed to, or deleted through the API.
pub const ALL_USERS_GROUP: &str = "Everyone";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Membership row. It has no id of its own: the (organization, user) pair
/// existing is the membership.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrganizationMember {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InsertGroupParams {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
}
