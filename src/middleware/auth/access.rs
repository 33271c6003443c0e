//! 上流 gateway が確立した identity を AuthCtx として extensions に入れる
//!
//! 認証はこのサービスの責務外:
//! - `x-auth-user-id: <uuid>` と `x-auth-roles: <role>,<role>` は gateway が付与する前提
//! - ここでは形式だけ検証し、欠落・不正なら 401

use axum::{
    Router,
    extract::Request,
    http::{HeaderMap, HeaderName},
    middleware::{self, Next},
    response::Response,
};
use uuid::Uuid;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-auth-user-id");
pub const ROLES_HEADER: HeaderName = HeaderName::from_static("x-auth-roles");

/// `/api/v1/*` に認証コンテキストを掛けるための middleware を適用する。
///
/// `layer` で掛けるので、route_layer で積む resolver stage より先に走る。
pub fn apply(router: Router<AppState>) -> Router<AppState> {
    router.layer(middleware::from_fn(access_middleware))
}

fn auth_ctx_from_headers(headers: &HeaderMap) -> Result<AuthCtx, AppError> {
    let user_id = headers
        .get(&USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(AppError::Unauthorized)?;

    let mut ctx = AuthCtx::new(user_id);
    ctx.roles = headers
        .get(&ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(ctx)
}

async fn access_middleware(mut req: Request, next: Next) -> Result<Response, AppError> {
    let auth_ctx = match auth_ctx_from_headers(req.headers()) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!("request without a valid upstream identity");
            return Err(err);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
