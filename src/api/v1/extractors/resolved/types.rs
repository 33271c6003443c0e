use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::repos::models::{Group, Organization, OrganizationMember, User};
use crate::state::AppState;

use super::core::require;

/// Membership row plus the two user fields a member reader may see.
///
/// The user record is fetched with elevated access, so only fields listed
/// here ever reach handlers. Adding one is a deliberate widening of what a
/// membership reader learns about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMemberView {
    pub member: OrganizationMember,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl OrganizationMemberView {
    pub fn restricted(member: OrganizationMember, user: &User) -> Self {
        Self {
            member,
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Organization resolved by the organization param stage.
pub struct OrganizationParam(pub Organization);

/// Group resolved by the group param stage.
pub struct GroupParam(pub Group);

/// Member view resolved by the organization member param stage.
pub struct OrganizationMemberParam(pub OrganizationMemberView);

impl FromRequestParts<AppState> for OrganizationParam {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let org = require::<Organization>(&parts.extensions, "organization param");
        Ok(Self(org.clone()))
    }
}

impl FromRequestParts<AppState> for GroupParam {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let group = require::<Group>(&parts.extensions, "group param");
        Ok(Self(group.clone()))
    }
}

impl FromRequestParts<AppState> for OrganizationMemberParam {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let member =
            require::<OrganizationMemberView>(&parts.extensions, "organization member param");
        Ok(Self(member.clone()))
    }
}
