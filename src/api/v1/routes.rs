/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - resolver stage を route_layer で積む (後に積んだ layer が先に走る)
 *   - /organizations/{organization}/...            : organization
 *   - /organizations/{organization}/members/{user} : organization → member
 *   - /groups/{group}                              : group → organization
 * - 認証コンテキストは layer で全 route に (health 以外)
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::get,
};

use crate::middleware::{
    auth::access,
    params::{extract_group_param, extract_organization_member_param, extract_organization_param},
};
use crate::state::AppState;

use crate::api::v1::handlers::{
    groups::{create_group, delete_group, get_group, list_groups, patch_group},
    health::health,
    organizations::{get_organization, get_organization_member},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let organizations = Router::new()
        .route("/organizations/{organization}", get(get_organization))
        .route(
            "/organizations/{organization}/groups",
            get(list_groups).post(create_group),
        )
        .route_layer(from_fn_with_state(state.clone(), extract_organization_param));

    let members = Router::new()
        .route(
            "/organizations/{organization}/members/{user}",
            get(get_organization_member),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            extract_organization_member_param,
        ))
        .route_layer(from_fn_with_state(state.clone(), extract_organization_param));

    let groups = Router::new()
        .route(
            "/groups/{group}",
            get(get_group).patch(patch_group).delete(delete_group),
        )
        .route_layer(from_fn_with_state(state.clone(), extract_organization_param))
        .route_layer(from_fn_with_state(state, extract_group_param));

    let protected = access::apply(organizations.merge(members).merge(groups));

    Router::new().route("/health", get(health)).merge(protected)
}
