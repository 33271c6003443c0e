/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: Store (PgStore / test では MemoryStore)
 *   - authz: 外部 policy engine
 * - Clone 前提で持つ (内部は Arc)
 * - 解決済みオブジェクトは request ごとに解決し、ここには置かない
 */
use std::sync::Arc;

use crate::repos::Store;
use crate::services::authz::Authorizer;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Store>,
    pub authz: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(db: Arc<dyn Store>, authz: Arc<dyn Authorizer>) -> Self {
        Self { db, authz }
    }
}
