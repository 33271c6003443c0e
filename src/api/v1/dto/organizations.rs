/*
 * Responsibility
 * - Organizations / organization member の response DTO
 * - member は OrganizationMemberView (username / avatar_url のみ) からだけ作る
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::v1::extractors::OrganizationMemberView;
use crate::repos::models::Organization;

#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            description: org.description,
            is_default: org.is_default,
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationMemberResponse {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationMemberView> for OrganizationMemberResponse {
    fn from(view: OrganizationMemberView) -> Self {
        Self {
            organization_id: view.member.organization_id,
            user_id: view.member.user_id,
            username: view.username,
            avatar_url: view.avatar_url,
            roles: view.member.roles,
            created_at: view.member.created_at,
            updated_at: view.member.updated_at,
        }
    }
}
