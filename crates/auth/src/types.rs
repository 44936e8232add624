//! Role, plan, and sanitized-identity types used for auth decisions

use serde::{Deserialize, Serialize};

use crate::claims::SessionPayload;
use crate::store::UserRecord;

/// User role for auth decisions.
///
/// A closed set ordered by privilege: farmer < expert < admin.
/// Gating is membership-based; no numeric ordering is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Farmer,
    Expert,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Expert => "expert",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "expert" => Ok(Role::Expert),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Subscription plan carried on user records and session claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(format!("unknown plan: {other}")),
        }
    }
}

/// Classification of a role transition for audit logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// non-admin -> admin
    Promote,
    /// admin -> non-admin
    Demote,
    /// any other change, e.g. farmer -> expert
    Update,
}

impl RoleChange {
    /// Classify a role transition; `None` when the role did not change.
    pub fn classify(previous: Role, next: Role) -> Option<RoleChange> {
        if previous == next {
            None
        } else if next == Role::Admin {
            Some(RoleChange::Promote)
        } else if previous == Role::Admin {
            Some(RoleChange::Demote)
        } else {
            Some(RoleChange::Update)
        }
    }

    /// Audit action identifier for this change
    pub fn as_action(self) -> &'static str {
        match self {
            RoleChange::Promote => "role.promote",
            RoleChange::Demote => "role.demote",
            RoleChange::Update => "role.update",
        }
    }
}

/// Public-safe projection of a user, returned by guards and embedded in
/// API responses.
///
/// Never carries the password hash or token bookkeeping fields
/// (`iat`, `nonce`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&UserRecord> for AuthIdentity {
    /// Sanitize a live user record into its public projection
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            email: record.email.clone(),
            name: record.name.clone(),
            role: record.role,
            organization: record.organization.clone(),
            plan: record.plan,
            avatar_url: record.avatar_url.clone(),
            created_at: Some(record.created_at.to_rfc3339()),
            updated_at: Some(record.updated_at.to_rfc3339()),
        }
    }
}

impl From<&SessionPayload> for AuthIdentity {
    /// Build an identity straight from trusted token claims (remote mode)
    fn from(claims: &SessionPayload) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
            organization: claims.organization.clone(),
            plan: claims.plan.unwrap_or_default(),
            avatar_url: claims.avatar_url.clone(),
            created_at: claims.created_at.clone(),
            updated_at: claims.updated_at.clone(),
        }
    }
}
