/*
 * Responsibility
 * - /organizations/{organization} と /organizations/{organization}/members/{user} の handler
 * - member は resolver stage が作った制限付き view だけを返す
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::organizations::{OrganizationMemberResponse, OrganizationResponse},
        extractors::{AuthCtxExtractor, OrganizationMemberParam, OrganizationParam},
    },
    error::AppError,
    services::authz::{Action, authorize},
    state::AppState,
};

pub async fn get_organization(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    OrganizationParam(org): OrganizationParam,
) -> Result<Json<OrganizationResponse>, AppError> {
    if !authorize(state.authz.as_ref(), &subject, Action::Read, &org).await {
        return Err(AppError::NotFound);
    }
    Ok(Json(org.into()))
}

pub async fn get_organization_member(
    State(state): State<AppState>,
    AuthCtxExtractor(subject): AuthCtxExtractor,
    OrganizationMemberParam(member): OrganizationMemberParam,
) -> Result<Json<OrganizationMemberResponse>, AppError> {
    if !authorize(state.authz.as_ref(), &subject, Action::Read, &member).await {
        return Err(AppError::NotFound);
    }
    Ok(Json(member.into()))
}
