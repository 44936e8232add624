//! Session token claims

use serde::{Deserialize, Serialize};

use crate::codec::TOKEN_VERSION;
use crate::types::{Plan, Role};

fn default_version() -> u8 {
    TOKEN_VERSION
}

/// The authoritative claims of an authenticated request, carried entirely
/// inside the signed token.
///
/// The optional profile fields are denormalized copies used when a remote
/// backend owns the user data and no local re-fetch is possible. Wire
/// field names match the session cookie format already in the wild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Claim-shape version discriminator
    #[serde(rename = "v", default = "default_version")]
    pub version: u8,
    /// Subject (user ID)
    pub sub: String,
    /// Normalized (lowercased) email address
    pub email: String,
    /// Role at token-issuance time
    pub role: Role,
    /// Issued at (epoch millis)
    pub iat: u64,
    /// Random per-token value so identical claims never produce
    /// byte-identical tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(rename = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SessionPayload {
    /// Create a minimal payload issued now.
    pub fn new(sub: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            version: TOKEN_VERSION,
            sub: sub.into(),
            email: email.into(),
            role,
            iat: chrono::Utc::now().timestamp_millis() as u64,
            nonce: None,
            name: None,
            organization: None,
            plan: None,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Attach denormalized profile fields for remote-backend deployments.
    pub fn with_profile(
        mut self,
        name: Option<String>,
        organization: Option<String>,
        plan: Option<Plan>,
        avatar_url: Option<String>,
    ) -> Self {
        self.name = name;
        self.organization = organization;
        self.plan = plan;
        self.avatar_url = avatar_url;
        self
    }
}
