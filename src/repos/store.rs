/*
 * Responsibility
 * - 永続層の契約 (query / command)
 * - handler / middleware はこの trait だけを見る (PgStore や test 用 store を差し替え可能)
 * - 権限レベルは AccessScope として引数で明示する (暗黙の context 切り替えはしない)
 */
use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::RepoResult;
use crate::repos::models::{Group, InsertGroupParams, Organization, OrganizationMember, User};

/// Capability a caller passes to reach records outside its own permissions.
///
/// Every call site that passes `SystemRestricted` is an elevated lookup and
/// must not leak the full record to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    SystemRestricted,
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get_default_organization(&self) -> RepoResult<Organization>;
    async fn get_organization_by_id(&self, id: Uuid) -> RepoResult<Organization>;
    async fn get_organization_by_name(&self, name: &str) -> RepoResult<Organization>;

    async fn get_user_by_id(&self, scope: AccessScope, id: Uuid) -> RepoResult<User>;

    /// All membership rows for the pair. Callers collapse with `expect_one`.
    async fn get_organization_members(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Vec<OrganizationMember>>;

    async fn get_group_by_id(&self, id: Uuid) -> RepoResult<Group>;
    async fn get_group_by_org_and_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepoResult<Group>;
    async fn get_groups_by_organization(&self, organization_id: Uuid) -> RepoResult<Vec<Group>>;
    async fn insert_group(&self, params: InsertGroupParams) -> RepoResult<Group>;
    async fn delete_group_by_id(&self, id: Uuid) -> RepoResult<()>;

    /// Users currently in the group, ordered by username.
    async fn get_group_members(&self, group_id: Uuid) -> RepoResult<Vec<User>>;

    /// Open an all-or-nothing unit of work.
    async fn begin(&self) -> RepoResult<Box<dyn StoreTx>>;
}

/// Writes performed inside a transaction. Dropping the handle without
/// `commit` discards every write made through it.
#[async_trait]
pub trait StoreTx: Send {
    async fn update_group_name(&mut self, id: Uuid, name: &str) -> RepoResult<Group>;
    async fn insert_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()>;
    /// Fails with `NotFound` when the user is not in the group.
    async fn delete_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()>;
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}
