/*
 * Responsibility
 * - Groups の request/response DTO
 * - validation (形式チェック) 用の validate() を持つ
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::models::{ALL_USERS_GROUP, Group, User};
use crate::services::group_mutation::GroupPatch;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

impl CreateGroupRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.name == ALL_USERS_GROUP {
            return Err(format!(
                "\"{ALL_USERS_GROUP}\" is a reserved keyword and cannot be used for a group name."
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub add_users: Vec<String>,
    #[serde(default)]
    pub remove_users: Vec<String>,
}

impl From<PatchGroupRequest> for GroupPatch {
    fn from(req: PatchGroupRequest) -> Self {
        GroupPatch {
            name: req.name,
            add_users: req.add_users,
            remove_users: req.remove_users,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupMemberResponse {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
    pub members: Vec<GroupMemberResponse>,
}

impl GroupResponse {
    pub fn new(group: Group, members: Vec<User>) -> Self {
        Self {
            id: group.id,
            name: group.name,
            organization_id: group.organization_id,
            members: members
                .into_iter()
                .map(|u| GroupMemberResponse {
                    id: u.id,
                    username: u.username,
                    avatar_url: u.avatar_url,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
