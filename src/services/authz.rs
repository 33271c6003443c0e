//! Authorization gate.
//!
//! The policy engine itself is external: it is reached through the
//! [`Authorizer`] trait. Handlers call [`authorize`] for a single resolved
//! object and [`authorize_filter`] before returning a collection. Decisions
//! are never cached; every call evaluates against the object passed in.
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::api::v1::extractors::{AuthCtx, OrganizationMemberView};
use crate::repos::models::{Group, Organization};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Organization,
    Group,
    OrganizationMember,
}

/// What the policy engine sees of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub resource_type: ResourceType,
    pub id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl Object {
    /// A not-yet-existing group inside `organization_id` (create checks).
    pub fn new_group_in(organization_id: Uuid) -> Self {
        Self {
            resource_type: ResourceType::Group,
            id: None,
            organization_id: Some(organization_id),
            owner_id: None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{:?}:{}", self.resource_type, id),
            None => write!(f, "{:?}:*", self.resource_type),
        }
    }
}

pub trait RbacObject {
    fn rbac_object(&self) -> Object;
}

impl RbacObject for Organization {
    fn rbac_object(&self) -> Object {
        Object {
            resource_type: ResourceType::Organization,
            id: Some(self.id),
            organization_id: Some(self.id),
            owner_id: None,
        }
    }
}

impl RbacObject for Group {
    fn rbac_object(&self) -> Object {
        Object {
            resource_type: ResourceType::Group,
            id: Some(self.id),
            organization_id: Some(self.organization_id),
            owner_id: None,
        }
    }
}

impl RbacObject for OrganizationMemberView {
    fn rbac_object(&self) -> Object {
        Object {
            resource_type: ResourceType::OrganizationMember,
            id: None,
            organization_id: Some(self.member.organization_id),
            owner_id: Some(self.member.user_id),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("forbidden")]
    Denied,
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}

/// The external decision function: subject x action x object.
#[async_trait]
pub trait Authorizer: Send + Sync + 'static {
    async fn authorize(
        &self,
        subject: &AuthCtx,
        action: Action,
        object: &Object,
    ) -> Result<(), AuthzError>;
}

/// Single-resource check. Any failure, including an evaluation error, denies.
pub async fn authorize<T: RbacObject>(
    authz: &dyn Authorizer,
    subject: &AuthCtx,
    action: Action,
    resource: &T,
) -> bool {
    authorize_object(authz, subject, action, &resource.rbac_object()).await
}

pub async fn authorize_object(
    authz: &dyn Authorizer,
    subject: &AuthCtx,
    action: Action,
    object: &Object,
) -> bool {
    match authz.authorize(subject, action, object).await {
        Ok(()) => {
            tracing::debug!(user_id = %subject.user_id, ?action, %object, "authorized");
            true
        }
        Err(AuthzError::Denied) => {
            tracing::debug!(user_id = %subject.user_id, ?action, %object, "denied");
            false
        }
        Err(err) => {
            tracing::warn!(
                user_id = %subject.user_id,
                ?action,
                %object,
                error = %err,
                "authorization failed"
            );
            false
        }
    }
}

/// Keep the resources the subject may act on, in their original order.
///
/// Unlike [`authorize`], an evaluation error is returned to the caller
/// instead of being folded into a denial.
pub async fn authorize_filter<T: RbacObject>(
    authz: &dyn Authorizer,
    subject: &AuthCtx,
    action: Action,
    resources: Vec<T>,
) -> Result<Vec<T>, AuthzError> {
    let mut allowed = Vec::with_capacity(resources.len());
    for resource in resources {
        match authz
            .authorize(subject, action, &resource.rbac_object())
            .await
        {
            Ok(()) => allowed.push(resource),
            Err(AuthzError::Denied) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(allowed)
}

/// Role-string policy used until an external engine is wired in.
///
/// - `owner`: every action on every object
/// - `org-admin:<org id>`: every action inside that organization
/// - `org-member:<org id>`: read inside that organization
/// - any subject may read its own organization membership
///
/// An organization role whose id is not a UUID fails the evaluation.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleAuthorizer;

impl StaticRoleAuthorizer {
    fn has_org_role(
        subject: &AuthCtx,
        role: &str,
        organization_id: Option<Uuid>,
    ) -> Result<bool, AuthzError> {
        let prefix = format!("{role}:");
        let mut granted = false;
        for raw in subject.roles.iter().filter_map(|r| r.strip_prefix(&prefix)) {
            let org = Uuid::parse_str(raw).map_err(|_| {
                AuthzError::Evaluation(format!("malformed role \"{role}:{raw}\""))
            })?;
            granted |= Some(org) == organization_id;
        }
        Ok(granted)
    }
}

#[async_trait]
impl Authorizer for StaticRoleAuthorizer {
    async fn authorize(
        &self,
        subject: &AuthCtx,
        action: Action,
        object: &Object,
    ) -> Result<(), AuthzError> {
        if subject.roles.iter().any(|r| r == "owner") {
            return Ok(());
        }
        if Self::has_org_role(subject, "org-admin", object.organization_id)? {
            return Ok(());
        }
        if action == Action::Read {
            if Self::has_org_role(subject, "org-member", object.organization_id)? {
                return Ok(());
            }
            if object.resource_type == ResourceType::OrganizationMember
                && object.owner_id == Some(subject.user_id)
            {
                return Ok(());
            }
        }
        Err(AuthzError::Denied)
    }
}
