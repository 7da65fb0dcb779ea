//! Authorization seam. Access decisions are delegated to an `AccessPolicy`
//! implementation; the pipeline only asks yes/no per entity and operation.

use std::fmt;

use axum::http::Method;

use crate::auth::SessionContext;
use crate::entities::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Operation::Read),
            Method::POST => Some(Operation::Create),
            Method::PUT => Some(Operation::Update),
            Method::DELETE => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

pub trait AccessPolicy: Send + Sync {
    fn check_access(&self, entity: Entity, operation: Operation, session: &SessionContext) -> bool;
}

/// Role-based policy: tenant roles get full access, customer roles are
/// read-only, anything else is denied outright.
#[derive(Debug, Clone)]
pub struct RoleAccessPolicy {
    tenant_roles: Vec<String>,
    customer_roles: Vec<String>,
}

impl RoleAccessPolicy {
    pub fn new(tenant_roles: Vec<String>, customer_roles: Vec<String>) -> Self {
        Self { tenant_roles, customer_roles }
    }

    pub fn from_config() -> Self {
        let security = &crate::config::config().security;
        Self::new(security.tenant_roles.clone(), security.customer_roles.clone())
    }

    fn has_any(&self, roles: &[String], granted: &[String]) -> bool {
        roles.iter().any(|r| granted.iter().any(|g| g == r))
    }
}

impl Default for RoleAccessPolicy {
    fn default() -> Self {
        Self::new(
            vec!["Owner".to_string(), "Admin".to_string()],
            vec![],
        )
    }
}

impl AccessPolicy for RoleAccessPolicy {
    fn check_access(&self, _entity: Entity, operation: Operation, session: &SessionContext) -> bool {
        if self.has_any(&session.roles, &self.tenant_roles) {
            return true;
        }
        if self.has_any(&session.roles, &self.customer_roles) {
            return operation == Operation::Read;
        }
        false
    }
}
