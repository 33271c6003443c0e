//! Group update coordinator: rename + add members + remove members as one
//! all-or-nothing change.
//!
//! Order of work:
//! 1. validate the request (reserved name, user ids, organization membership)
//! 2. pre-check the new name against the organization's other groups
//! 3. one transaction: rename, inserts, deletes
//! 4. re-read the roster after commit
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::models::{ALL_USERS_GROUP, Group, User};
use crate::repos::{RepoError, Store, StoreTx, expect_one};

#[derive(Debug, Clone, Default)]
pub struct GroupPatch {
    /// `None` or empty leaves the name unchanged.
    pub name: Option<String>,
    pub add_users: Vec<String>,
    pub remove_users: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PatchedGroup {
    pub group: Group,
    pub members: Vec<User>,
}

#[derive(Debug, Error)]
pub enum GroupMutationError {
    #[error("\"{0}\" is a reserved group name")]
    ReservedName(&'static str),
    #[error("ID \"{0}\" must be a valid user UUID")]
    InvalidUserId(String),
    #[error("user {user_id} must be a member of organization {organization_id}")]
    NotOrganizationMember {
        user_id: Uuid,
        organization_id: Uuid,
    },
    #[error("a group with name \"{0}\" already exists")]
    NameTaken(String),
    #[error("user already in group: {0}")]
    DuplicateMember(String),
    #[error("member does not exist: {0}")]
    MissingMember(String),
    #[error("storage: {0}")]
    Repo(#[from] RepoError),
}

impl From<GroupMutationError> for AppError {
    fn from(e: GroupMutationError) -> Self {
        match e {
            GroupMutationError::ReservedName(name) => {
                AppError::bad_request(format!("\"{name}\" is a reserved group name!"))
            }
            GroupMutationError::InvalidUserId(id) => {
                AppError::bad_request(format!("ID \"{id}\" must be a valid user UUID."))
            }
            GroupMutationError::NotOrganizationMember {
                user_id,
                organization_id,
            } => AppError::precondition_failed(
                format!(
                    "User \"{user_id}\" must be a member of organization \"{organization_id}\"."
                ),
                None,
            ),
            GroupMutationError::NameTaken(name) => {
                AppError::conflict(format!("A group with name \"{name}\" already exists."))
            }
            GroupMutationError::DuplicateMember(detail) => AppError::precondition_failed(
                "Cannot add the same user to a group twice!",
                Some(detail),
            ),
            GroupMutationError::MissingMember(detail) => AppError::precondition_failed(
                "Failed to add or remove non-existent group member.",
                Some(detail),
            ),
            GroupMutationError::Repo(err) => {
                AppError::internal("Internal error updating group.", err)
            }
        }
    }
}

struct ValidPatch {
    name: Option<String>,
    add: Vec<Uuid>,
    remove: Vec<Uuid>,
}

fn parse_user_ids(ids: &[String]) -> Result<Vec<Uuid>, GroupMutationError> {
    ids.iter()
        .map(|id| Uuid::parse_str(id).map_err(|_| GroupMutationError::InvalidUserId(id.clone())))
        .collect()
}

async fn validate(
    store: &dyn Store,
    group: &Group,
    patch: GroupPatch,
) -> Result<ValidPatch, GroupMutationError> {
    let name = patch.name.filter(|n| !n.is_empty());
    if name.as_deref() == Some(ALL_USERS_GROUP) {
        return Err(GroupMutationError::ReservedName(ALL_USERS_GROUP));
    }
    // The system group keeps its name; membership edits are still allowed.
    if group.name == ALL_USERS_GROUP && name.as_deref().is_some_and(|n| n != group.name) {
        return Err(GroupMutationError::ReservedName(ALL_USERS_GROUP));
    }

    let add = parse_user_ids(&patch.add_users)?;
    let remove = parse_user_ids(&patch.remove_users)?;

    // Group membership is only meaningful for members of the owning
    // organization; the schema cannot express this because membership rows
    // have no id to reference.
    for &user_id in add.iter().chain(remove.iter()) {
        let rows = store
            .get_organization_members(group.organization_id, user_id)
            .await;
        match rows.and_then(expect_one) {
            Ok(_) => {}
            Err(RepoError::NotFound) => {
                return Err(GroupMutationError::NotOrganizationMember {
                    user_id,
                    organization_id: group.organization_id,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(ValidPatch { name, add, remove })
}

async fn check_name_available(
    store: &dyn Store,
    group: &Group,
    name: &str,
) -> Result<(), GroupMutationError> {
    match store
        .get_group_by_org_and_name(group.organization_id, name)
        .await
    {
        Ok(existing) if existing.id != group.id => {
            Err(GroupMutationError::NameTaken(name.to_string()))
        }
        Ok(_) | Err(RepoError::NotFound) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn apply(
    tx: &mut dyn StoreTx,
    group: &Group,
    patch: &ValidPatch,
) -> Result<Group, GroupMutationError> {
    let mut updated = group.clone();

    if let Some(name) = &patch.name {
        updated = tx
            .update_group_name(group.id, name)
            .await
            .map_err(|e| match e {
                // lost a race against a concurrent rename
                RepoError::UniqueViolation(_) => GroupMutationError::NameTaken(name.clone()),
                other => other.into(),
            })?;
    }

    for &user_id in &patch.add {
        tx.insert_group_member(group.id, user_id)
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation(c) => GroupMutationError::DuplicateMember(format!(
                    "insert group member {user_id}: {c}"
                )),
                other => other.into(),
            })?;
    }

    for &user_id in &patch.remove {
        tx.delete_group_member(group.id, user_id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => {
                    GroupMutationError::MissingMember(format!("delete group member {user_id}"))
                }
                other => other.into(),
            })?;
    }

    Ok(updated)
}

/// Apply `patch` to `group` atomically and return the committed state.
///
/// On any error nothing is written: the transaction is dropped without
/// commit.
pub async fn patch_group(
    store: &dyn Store,
    group: Group,
    patch: GroupPatch,
) -> Result<PatchedGroup, GroupMutationError> {
    let patch = validate(store, &group, patch).await?;

    if let Some(name) = &patch.name {
        check_name_available(store, &group, name).await?;
    }

    let mut tx = store.begin().await?;
    let updated = match apply(tx.as_mut(), &group, &patch).await {
        Ok(updated) => updated,
        Err(err) => {
            tracing::debug!(group_id = %group.id, error = %err, "group update rolled back");
            return Err(err);
        }
    };
    tx.commit().await?;

    let members = store.get_group_members(updated.id).await?;

    tracing::info!(
        group_id = %updated.id,
        renamed = patch.name.is_some(),
        added = patch.add.len(),
        removed = patch.remove.len(),
        "group updated"
    );

    Ok(PatchedGroup {
        group: updated,
        members,
    })
}
