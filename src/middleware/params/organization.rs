//! Organization resolver stage (`{organization}`).
//!
//! Accepts the `default` alias, a UUID, or an organization name.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::v1::extractors::resolved;
use crate::error::AppError;
use crate::repos::{RepoError, Store, models::Organization};
use crate::state::AppState;

use super::route_params::{ORGANIZATION, RouteParams, param};

/// Alias for the singleton default organization.
pub const DEFAULT_ORGANIZATION: &str = "default";

// Older provisioners always send the nil id instead of an organization.
// TODO: drop this once those provisioners send a real organization id.
fn is_legacy_nil_organization(arg: &str) -> bool {
    arg == Uuid::nil().to_string()
}

pub async fn resolve_organization(
    store: &dyn Store,
    params: &RouteParams,
) -> Result<Organization, AppError> {
    let arg = param(params, ORGANIZATION)?;

    let result = if arg == DEFAULT_ORGANIZATION || is_legacy_nil_organization(arg) {
        store.get_default_organization().await
    } else {
        match Uuid::parse_str(arg) {
            Ok(id) => store.get_organization_by_id(id).await,
            Err(_) => store.get_organization_by_name(arg).await,
        }
    };

    match result {
        Ok(org) => Ok(org),
        Err(RepoError::NotFound) => {
            tracing::debug!(organization = arg, "organization not found");
            Err(AppError::NotFound)
        }
        Err(err) => Err(AppError::internal(
            format!("Internal error fetching organization \"{arg}\"."),
            err,
        )),
    }
}

/// Middleware: resolve `{organization}` and publish the [`Organization`].
pub async fn extract_organization_param(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = RouteParams::load(&mut req).await;
    let organization = resolve_organization(state.db.as_ref(), &params).await?;

    resolved::publish(req.extensions_mut(), organization)?;
    params.store(&mut req);
    Ok(next.run(req).await)
}
