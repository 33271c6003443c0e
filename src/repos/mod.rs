/*
 * Responsibility
 * - 永続層の公開インターフェース (Store 契約 / 行の型 / エラー)
 */
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod pg;
pub mod store;

pub use error::{RepoError, expect_one};
pub use store::{AccessScope, Store, StoreTx};
