//! Organization member resolver stage (`{user}` inside `{organization}`).
//!
//! Requires the organization stage ahead of it. The user record is read with
//! [`AccessScope::SystemRestricted`] because a caller allowed to see a
//! membership may not be allowed to see the user. The user itself is never
//! published; only [`OrganizationMemberView`] is.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::v1::extractors::{AuthCtx, OrganizationMemberView, resolved};
use crate::error::AppError;
use crate::repos::{AccessScope, RepoError, Store, expect_one, models::Organization};
use crate::state::AppState;

use super::route_params::{RouteParams, USER, param, uuid_param};

/// Alias for the authenticated caller.
pub const ME: &str = "me";

fn user_id(params: &RouteParams, subject: Option<&AuthCtx>) -> Result<Uuid, AppError> {
    if param(params, USER)? == ME {
        return subject.map(|s| s.user_id).ok_or(AppError::Unauthorized);
    }
    uuid_param(params, USER)
}

pub async fn resolve_organization_member(
    store: &dyn Store,
    params: &RouteParams,
    organization: &Organization,
    subject: Option<&AuthCtx>,
) -> Result<OrganizationMemberView, AppError> {
    let user_id = user_id(params, subject)?;

    let user = match store
        .get_user_by_id(AccessScope::SystemRestricted, user_id)
        .await
    {
        Ok(user) => user,
        Err(RepoError::NotFound) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::internal("Internal error fetching user.", err)),
    };

    let rows = store
        .get_organization_members(organization.id, user.id)
        .await;
    let member = match rows.and_then(expect_one) {
        Ok(member) => member,
        Err(RepoError::NotFound) => return Err(AppError::NotFound),
        Err(err) => {
            return Err(AppError::internal(
                "Internal error fetching organization member.",
                err,
            ));
        }
    };

    Ok(OrganizationMemberView::restricted(member, &user))
}

/// Middleware: resolve `{user}` as a member of the resolved organization.
pub async fn extract_organization_member_param(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = RouteParams::load(&mut req).await;
    let organization =
        resolved::require::<Organization>(req.extensions(), "organization param").clone();
    let subject = req.extensions().get::<AuthCtx>().cloned();

    let view =
        resolve_organization_member(state.db.as_ref(), &params, &organization, subject.as_ref())
            .await?;

    resolved::publish(req.extensions_mut(), view)?;
    params.store(&mut req);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryStore;
    use crate::repos::models::User;
    use axum::http::StatusCode;

    fn params(user: &str) -> RouteParams {
        [(USER, user)].into_iter().collect()
    }

    fn seeded() -> (MemoryStore, Organization, User) {
        let store = MemoryStore::new();
        let org = store.insert_organization("acme", false);
        let user = store.insert_user("alice");
        store.insert_organization_member(org.id, user.id);
        (store, org, user)
    }

    #[tokio::test]
    async fn view_carries_only_username_and_avatar() {
        let (store, org, user) = seeded();

        let view = resolve_organization_member(&store, &params(&user.id.to_string()), &org, None)
            .await
            .unwrap();

        assert_eq!(view.member.organization_id, org.id);
        assert_eq!(view.member.user_id, user.id);
        assert_eq!(view.username, "alice");
        assert_eq!(view.avatar_url, user.avatar_url);
        assert!(!format!("{view:?}").contains(&user.email));
    }

    #[tokio::test]
    async fn user_lookup_is_system_restricted() {
        let (store, org, user) = seeded();
        resolve_organization_member(&store, &params(&user.id.to_string()), &org, None)
            .await
            .unwrap();
        assert_eq!(store.user_lookup_scopes(), [AccessScope::SystemRestricted]);
    }

    #[tokio::test]
    async fn me_resolves_to_the_subject() {
        let (store, org, user) = seeded();
        let subject = AuthCtx::new(user.id);
        let view = resolve_organization_member(&store, &params(ME), &org, Some(&subject))
            .await
            .unwrap();
        assert_eq!(view.member.user_id, user.id);

        let err = resolve_organization_member(&store, &params(ME), &org, None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_member_is_not_found() {
        let (store, org, _) = seeded();
        let outsider = store.insert_user("mallory");
        let err = resolve_organization_member(&store, &params(&outsider.id.to_string()), &org, None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_membership_rows_are_internal() {
        let (store, org, user) = seeded();
        store.insert_organization_member(org.id, user.id);
        let err = resolve_organization_member(&store, &params(&user.id.to_string()), &org, None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
