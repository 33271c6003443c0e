/*
 * Responsibility
 * - Store の PostgreSQL 実装 (SQLx)
 * - PgPool を保持し、sqlx::Error は RepoError::from_sqlx で意味付けして返す
 * - transaction は sqlx::Transaction をそのまま包む (drop = rollback)
 */
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::models::{Group, InsertGroupParams, Organization, OrganizationMember, User};
use crate::repos::store::{AccessScope, Store, StoreTx};

const ORGANIZATION_COLUMNS: &str = "id, name, description, is_default, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, username, avatar_url, created_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_default_organization(&self) -> RepoResult<Organization> {
        let row = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE is_default = true"
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_organization_by_id(&self, id: Uuid) -> RepoResult<Organization> {
        let row = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_organization_by_name(&self, name: &str) -> RepoResult<Organization> {
        let row = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_user_by_id(&self, scope: AccessScope, id: Uuid) -> RepoResult<User> {
        match scope {
            AccessScope::SystemRestricted => {
                tracing::debug!(user_id = %id, "system-restricted user lookup");
            }
        }

        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_organization_members(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Vec<OrganizationMember>> {
        let rows = sqlx::query_as::<_, OrganizationMember>(
            r#"
            SELECT organization_id, user_id, roles, created_at, updated_at
            FROM organization_members
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(rows)
    }

    async fn get_group_by_id(&self, id: Uuid) -> RepoResult<Group> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, organization_id
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_group_by_org_and_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepoResult<Group> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, organization_id
            FROM groups
            WHERE organization_id = $1 AND name = $2
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_groups_by_organization(&self, organization_id: Uuid) -> RepoResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, organization_id
            FROM groups
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(rows)
    }

    async fn insert_group(&self, params: InsertGroupParams) -> RepoResult<Group> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (id, name, organization_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, organization_id
            "#,
        )
        .bind(params.id)
        .bind(&params.name)
        .bind(params.organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete_group_by_id(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn get_group_members(&self, group_id: Uuid) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT users.id, users.email, users.username, users.avatar_url, users.created_at
            FROM users
            JOIN group_members ON group_members.user_id = users.id
            WHERE group_members.group_id = $1
            ORDER BY users.username
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(rows)
    }

    async fn begin(&self) -> RepoResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await.map_err(RepoError::from_sqlx)?;
        Ok(Box::new(PgTx { tx }))
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn update_group_name(&mut self, id: Uuid, name: &str) -> RepoResult<Group> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = $2
            WHERE id = $1
            RETURNING id, name, organization_id
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn insert_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(())
    }

    async fn delete_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_members
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(RepoError::from_sqlx)
    }
}
