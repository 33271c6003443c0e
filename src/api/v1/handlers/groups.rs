/*
 * Responsibility
 * - /organizations/{organization}/groups, /groups/{group} 系 handler
 * - resolver stage が解決した Organization / Group を受け取り、本処理の前に authz を通す
 * - 認可拒否は 404 (存在を教えない)
 * - body は認可の後に parse する
 */
use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::groups::{CreateGroupRequest, GroupResponse, MessageResponse, PatchGroupRequest},
        extractors::{AuthCtxExtractor, GroupParam, OrganizationParam},
    },
    error::AppError,
    repos::{
        RepoError,
        models::{ALL_USERS_GROUP, InsertGroupParams},
    },
    services::{
        authz::{Action, Object, authorize, authorize_filter, authorize_object},
        group_mutation,
    },
    state::AppState,
};

fn read_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        AppError::bad_request_with_detail("Request body must be valid JSON.", e.to_string())
    })
}

pub async fn list_groups(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    OrganizationParam(org): OrganizationParam,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    let groups = match state.db.get_groups_by_organization(org.id).await {
        Ok(groups) => groups,
        Err(RepoError::NotFound) => Vec::new(),
        Err(err) => return Err(AppError::internal("Internal error fetching groups.", err)),
    };

    // A failing filter is an internal error, unlike a single denied check.
    let groups = authorize_filter(state.authz.as_ref(), &subject, Action::Read, groups)
        .await
        .map_err(|e| AppError::internal("Internal error fetching groups.", e))?;

    let mut res = Vec::with_capacity(groups.len());
    for group in groups {
        let members = state.db.get_group_members(group.id).await?;
        res.push(GroupResponse::new(group, members));
    }

    Ok(Json(res))
}

pub async fn create_group(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    OrganizationParam(org): OrganizationParam,
    body: Bytes,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let object = Object::new_group_in(org.id);
    if !authorize_object(state.authz.as_ref(), &subject, Action::Create, &object).await {
        return Err(AppError::NotFound);
    }

    let req: CreateGroupRequest = read_json(&body)?;
    req.validate().map_err(AppError::bad_request)?;

    let group = match state
        .db
        .insert_group(InsertGroupParams {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            organization_id: org.id,
        })
        .await
    {
        Ok(group) => group,
        Err(RepoError::UniqueViolation(_)) => {
            return Err(AppError::conflict(format!(
                "Group with name \"{}\" already exists.",
                req.name
            )));
        }
        Err(err) => return Err(AppError::internal("Internal error creating group.", err)),
    };

    tracing::info!(group_id = %group.id, organization_id = %org.id, "group created");
    Ok((StatusCode::CREATED, Json(GroupResponse::new(group, Vec::new()))))
}

pub async fn get_group(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    GroupParam(group): GroupParam,
) -> Result<Json<GroupResponse>, AppError> {
    if !authorize(state.authz.as_ref(), &subject, Action::Read, &group).await {
        return Err(AppError::NotFound);
    }

    let members = state.db.get_group_members(group.id).await?;
    Ok(Json(GroupResponse::new(group, members)))
}

pub async fn patch_group(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    GroupParam(group): GroupParam,
    body: Bytes,
) -> Result<Json<GroupResponse>, AppError> {
    if !authorize(state.authz.as_ref(), &subject, Action::Update, &group).await {
        return Err(AppError::NotFound);
    }

    let req: PatchGroupRequest = read_json(&body)?;
    let patched = group_mutation::patch_group(state.db.as_ref(), group, req.into()).await?;

    Ok(Json(GroupResponse::new(patched.group, patched.members)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    GroupParam(group): GroupParam,
) -> Result<Json<MessageResponse>, AppError> {
    if !authorize(state.authz.as_ref(), &subject, Action::Delete, &group).await {
        return Err(AppError::NotFound);
    }

    if group.name == ALL_USERS_GROUP {
        return Err(AppError::bad_request(format!(
            "\"{ALL_USERS_GROUP}\" is a reserved group and cannot be deleted!"
        )));
    }

    match state.db.delete_group_by_id(group.id).await {
        Ok(()) => {}
        Err(RepoError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::internal("Internal error deleting group.", err)),
    }

    tracing::info!(group_id = %group.id, "group deleted");
    Ok(Json(MessageResponse {
        message: "Successfully deleted group!".into(),
    }))
}
