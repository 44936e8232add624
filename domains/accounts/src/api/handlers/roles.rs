//! Admin role management handler
//!
//! Implements PATCH /api/admin/users/{id}/role — change a user's role,
//! guarded by `AdminUser` and the root-admin demotion policy, with every
//! effective change recorded in the audit log.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use agrisense_auth::{AdminUser, AuthIdentity, Role, RoleChange};
use agrisense_common::Error;

use crate::api::state::AccountsState;
use crate::audit::{AuditActor, AuditEntry, AuditTarget};

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdateResponse {
    pub message: &'static str,
    pub data: AuthIdentity,
}

/// PATCH /api/admin/users/{id}/role
pub async fn update_role(
    State(state): State<AccountsState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<RoleUpdateRequest>,
) -> Result<Json<RoleUpdateResponse>, Error> {
    let user = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    // The root admin cannot be demoted, regardless of who asks.
    if state
        .auth
        .config()
        .root_admin
        .forbids_role_change(&user.email, req.role)
    {
        return Err(Error::Authorization(
            "The primary administrator cannot be demoted".to_string(),
        ));
    }

    // Idempotent: re-asserting the current role writes and audits nothing.
    let previous_role = user.role;
    let Some(change) = RoleChange::classify(previous_role, req.role) else {
        return Ok(Json(RoleUpdateResponse {
            message: "Role updated",
            data: AuthIdentity::from(&user),
        }));
    };

    let updated = state
        .store
        .update_role(&user.id, req.role)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    state
        .audit
        .record(AuditEntry {
            actor: AuditActor {
                id: admin.id.clone(),
                email: admin.email.clone(),
                name: admin.name.clone(),
            },
            action: change.as_action().to_string(),
            target: AuditTarget {
                id: updated.id.clone(),
                email: Some(updated.email.clone()),
                name: updated.name.clone(),
            },
            metadata: json!({
                "previousRole": previous_role,
                "nextRole": updated.role,
            }),
        })
        .await?;

    tracing::info!(
        actor = %admin.id,
        target = %updated.id,
        action = change.as_action(),
        "user role changed"
    );

    Ok(Json(RoleUpdateResponse {
        message: "Role updated",
        data: AuthIdentity::from(&updated),
    }))
}
