//! In-memory `Store` for tests.
//!
//! Mirrors the PostgreSQL schema constraints that the resolvers and the
//! mutation coordinator rely on: unique group names per organization,
//! unique group membership, and all-or-nothing transactions.
//! Cloning shares the same underlying data.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Barrier, Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::models::{Group, InsertGroupParams, Organization, OrganizationMember, User};
use crate::repos::store::{AccessScope, Store, StoreTx};

#[derive(Clone, Debug, Default)]
struct Tables {
    organizations: Vec<Organization>,
    users: Vec<User>,
    organization_members: Vec<OrganizationMember>,
    groups: Vec<Group>,
    group_members: Vec<(Uuid, Uuid)>,
}

impl Tables {
    fn group_by_id(&self, id: Uuid) -> RepoResult<Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    fn group_name_taken(&self, organization_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.groups.iter().any(|g| {
            g.organization_id == organization_id && g.name == name && Some(g.id) != except
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    // Serializes writers the way row locks would.
    writer: Arc<AsyncMutex<()>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
    scopes: Arc<Mutex<Vec<AccessScope>>>,
    begin_gate: Arc<Mutex<Option<Arc<Barrier>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_organization(&self, name: &str, is_default: bool) -> Organization {
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            is_default,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().organizations.push(org.clone());
        org
    }

    pub fn insert_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            avatar_url: Some(format!("https://avatars.example.com/{username}.png")),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn insert_organization_member(&self, organization_id: Uuid, user_id: Uuid) {
        let now = Utc::now();
        self.tables
            .lock()
            .unwrap()
            .organization_members
            .push(OrganizationMember {
                organization_id,
                user_id,
                roles: Vec::new(),
                created_at: now,
                updated_at: now,
            });
    }

    pub fn insert_group_row(&self, organization_id: Uuid, name: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            organization_id,
        };
        self.tables.lock().unwrap().groups.push(group.clone());
        group
    }

    pub fn insert_group_member_row(&self, group_id: Uuid, user_id: Uuid) {
        self.tables
            .lock()
            .unwrap()
            .group_members
            .push((group_id, user_id));
    }

    /// Make every subsequent call to `op` fail with `Unavailable`.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Hold every `begin` until `parties` callers are waiting in it.
    pub fn gate_begin(&self, parties: usize) {
        *self.begin_gate.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }

    /// Scopes passed to `get_user_by_id`, in call order.
    pub fn user_lookup_scopes(&self) -> Vec<AccessScope> {
        self.scopes.lock().unwrap().clone()
    }

    pub fn group_member_ids(&self, group_id: Uuid) -> Vec<Uuid> {
        self.tables
            .lock()
            .unwrap()
            .group_members
            .iter()
            .filter(|(g, _)| *g == group_id)
            .map(|(_, u)| *u)
            .collect()
    }

    pub fn group(&self, id: Uuid) -> Option<Group> {
        self.tables.lock().unwrap().group_by_id(id).ok()
    }

    fn check(&self, op: &'static str) -> RepoResult<()> {
        check(&self.failing, op)
    }

    fn read(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }
}

fn check(failing: &Mutex<HashSet<&'static str>>, op: &'static str) -> RepoResult<()> {
    if failing.lock().unwrap().contains(op) {
        return Err(RepoError::Unavailable(format!("{op} failed")));
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_default_organization(&self) -> RepoResult<Organization> {
        self.check("get_default_organization")?;
        self.read()
            .organizations
            .into_iter()
            .find(|o| o.is_default)
            .ok_or(RepoError::NotFound)
    }

    async fn get_organization_by_id(&self, id: Uuid) -> RepoResult<Organization> {
        self.check("get_organization_by_id")?;
        self.read()
            .organizations
            .into_iter()
            .find(|o| o.id == id)
            .ok_or(RepoError::NotFound)
    }

    async fn get_organization_by_name(&self, name: &str) -> RepoResult<Organization> {
        self.check("get_organization_by_name")?;
        self.read()
            .organizations
            .into_iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .ok_or(RepoError::NotFound)
    }

    async fn get_user_by_id(&self, scope: AccessScope, id: Uuid) -> RepoResult<User> {
        self.scopes.lock().unwrap().push(scope);
        self.check("get_user_by_id")?;
        self.read()
            .users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)
    }

    async fn get_organization_members(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Vec<OrganizationMember>> {
        self.check("get_organization_members")?;
        Ok(self
            .read()
            .organization_members
            .into_iter()
            .filter(|m| m.organization_id == organization_id && m.user_id == user_id)
            .collect())
    }

    async fn get_group_by_id(&self, id: Uuid) -> RepoResult<Group> {
        self.check("get_group_by_id")?;
        self.read().group_by_id(id)
    }

    async fn get_group_by_org_and_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepoResult<Group> {
        self.check("get_group_by_org_and_name")?;
        self.read()
            .groups
            .into_iter()
            .find(|g| g.organization_id == organization_id && g.name == name)
            .ok_or(RepoError::NotFound)
    }

    async fn get_groups_by_organization(&self, organization_id: Uuid) -> RepoResult<Vec<Group>> {
        self.check("get_groups_by_organization")?;
        let mut groups: Vec<Group> = self
            .read()
            .groups
            .into_iter()
            .filter(|g| g.organization_id == organization_id)
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn insert_group(&self, params: InsertGroupParams) -> RepoResult<Group> {
        let _writer = self.writer.lock().await;
        self.check("insert_group")?;
        let mut tables = self.tables.lock().unwrap();
        if tables.group_name_taken(params.organization_id, &params.name, None) {
            return Err(RepoError::UniqueViolation("groups_name_organization_id_key".into()));
        }
        let group = Group {
            id: params.id,
            name: params.name,
            organization_id: params.organization_id,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn delete_group_by_id(&self, id: Uuid) -> RepoResult<()> {
        let _writer = self.writer.lock().await;
        self.check("delete_group_by_id")?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        if tables.groups.len() == before {
            return Err(RepoError::NotFound);
        }
        tables.group_members.retain(|(g, _)| *g != id);
        Ok(())
    }

    async fn get_group_members(&self, group_id: Uuid) -> RepoResult<Vec<User>> {
        self.check("get_group_members")?;
        let tables = self.read();
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| tables.group_members.contains(&(group_id, u.id)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn begin(&self) -> RepoResult<Box<dyn StoreTx>> {
        let gate = self.begin_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let writer = self.writer.clone().lock_owned().await;
        self.check("begin")?;
        Ok(Box::new(MemoryTx {
            _writer: writer,
            staged: self.read(),
            tables: self.tables.clone(),
            failing: self.failing.clone(),
        }))
    }
}

/// Works on a private copy of the tables; `commit` publishes it.
struct MemoryTx {
    _writer: OwnedMutexGuard<()>,
    staged: Tables,
    tables: Arc<Mutex<Tables>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn update_group_name(&mut self, id: Uuid, name: &str) -> RepoResult<Group> {
        check(&self.failing, "update_group_name")?;
        let group = self.staged.group_by_id(id)?;
        if self
            .staged
            .group_name_taken(group.organization_id, name, Some(id))
        {
            return Err(RepoError::UniqueViolation("groups_name_organization_id_key".into()));
        }
        let row = self
            .staged
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(RepoError::NotFound)?;
        row.name = name.to_string();
        Ok(row.clone())
    }

    async fn insert_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        check(&self.failing, "insert_group_member")?;
        if self.staged.group_members.contains(&(group_id, user_id)) {
            return Err(RepoError::UniqueViolation("group_members_pkey".into()));
        }
        self.staged.group_members.push((group_id, user_id));
        Ok(())
    }

    async fn delete_group_member(&mut self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        check(&self.failing, "delete_group_member")?;
        let before = self.staged.group_members.len();
        self.staged
            .group_members
            .retain(|pair| *pair != (group_id, user_id));
        if self.staged.group_members.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        check(&self.failing, "commit")?;
        let this = *self;
        *this.tables.lock().unwrap() = this.staged;
        Ok(())
    }
}
