//! Group resolver stage (`{group}`).
//!
//! Besides publishing the [`Group`], it republishes the group's owning
//! organization as `{organization}` so a later organization stage resolves
//! the true owner without the caller naming it.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::resolved;
use crate::error::AppError;
use crate::repos::{RepoError, Store, models::Group};
use crate::state::AppState;

use super::route_params::{
    GROUP, ORGANIZATION, ParamOverrides, Resolution, RouteParams, uuid_param,
};

pub async fn resolve_group(
    store: &dyn Store,
    params: &RouteParams,
) -> Result<Resolution<Group>, AppError> {
    let group_id = uuid_param(params, GROUP)?;

    let group = match store.get_group_by_id(group_id).await {
        Ok(group) => group,
        Err(RepoError::NotFound) => {
            tracing::debug!(%group_id, "group not found");
            return Err(AppError::NotFound);
        }
        Err(err) => {
            return Err(AppError::internal(
                format!("Internal error fetching group \"{group_id}\"."),
                err,
            ));
        }
    };

    let overrides = ParamOverrides::none().set(ORGANIZATION, group.organization_id.to_string());
    Ok(Resolution {
        value: group,
        overrides,
    })
}

/// Middleware: resolve `{group}`, publish the [`Group`] and its owner id.
pub async fn extract_group_param(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = RouteParams::load(&mut req).await;
    let Resolution { value, overrides } = resolve_group(state.db.as_ref(), &params).await?;

    resolved::publish(req.extensions_mut(), value)?;
    params.merged(overrides).store(&mut req);
    Ok(next.run(req).await)
}
