/*
 * Responsibility
 * - handler が受け取る extractor の公開インターフェース
 * - auth_ctx: 上流で確立された認証主体
 * - resolved: resolver stage が request に載せた解決済みオブジェクト
 */
mod auth_ctx;
pub mod resolved;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use resolved::{GroupParam, OrganizationMemberParam, OrganizationMemberView, OrganizationParam};
