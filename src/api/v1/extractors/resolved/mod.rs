/*!
 * Resolved request context
 *
 * Responsibility:
 * - resolver stage が解決したオブジェクトを request 単位で保持する (型ごとに 1 回だけ書ける)
 * - handler へは OrganizationParam / GroupParam / OrganizationMemberParam として渡す
 * - 未解決のまま読むのは middleware 構成ミス (developer error) なので panic する
 */

mod core;
mod types;

#[cfg(test)]
pub use core::lookup;
pub use core::{publish, require};
pub use types::{GroupParam, OrganizationMemberParam, OrganizationMemberView, OrganizationParam};
