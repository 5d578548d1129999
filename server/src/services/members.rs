//! Back-office member management. Admin only.

use serde::Deserialize;
use uuid::Uuid;

use super::auth::{hash_password, validate_password_strength};
use super::validation::{FieldErrors, normalize_email};
use super::{ActionError, require_admin, with_context};
use crate::backend::Backend;
use crate::backend::records::{Caller, Member, MemberChanges, NewMember, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Editor
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

async fn ensure_email_free(backend: &Backend, email: &str, except: Option<Uuid>) -> Result<bool, ActionError> {
    let existing = backend
        .members
        .find_login(email)
        .await
        .map_err(with_context("failed to look up member"))?;
    Ok(existing.is_none_or(|(member, _)| Some(member.id) == except))
}

pub async fn list(backend: &Backend, caller: Option<&Caller>) -> Result<Vec<Member>, ActionError> {
    require_admin(caller)?;
    backend
        .members
        .list_members()
        .await
        .map_err(with_context("failed to fetch members"))
}

pub async fn create(backend: &Backend, caller: Option<&Caller>, input: MemberInput) -> Result<Member, ActionError> {
    let caller = require_admin(caller)?;

    let mut errors = FieldErrors::new();
    let email = normalize_email(&input.email);
    if email.is_none() {
        errors.add("email", "Invalid email address.");
    }
    errors.required("name", &input.name, "Name is required");
    if let Some(message) = validate_password_strength(&input.password) {
        errors.add("password", message);
    }
    errors.finish()?;
    let email = email.unwrap_or_default();

    if !ensure_email_free(backend, &email, None).await? {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is already in use.");
        return Err(ActionError::Invalid(errors));
    }

    let member = backend
        .members
        .insert_member(NewMember {
            email,
            name: input.name.trim().to_owned(),
            role: input.role,
            password_hash: hash_password(&input.password)?,
        })
        .await
        .map_err(with_context("failed to create user"))?;

    tracing::info!(member_id = %member.id, role = member.role.as_str(), admin_id = %caller.id, "member created");
    Ok(member)
}

pub async fn update(backend: &Backend, caller: Option<&Caller>, id: Uuid, patch: MemberPatch) -> Result<(), ActionError> {
    let caller = require_admin(caller)?;
    if id == caller.id && patch.role.is_some_and(|role| role != Role::Admin) {
        return Err(ActionError::Forbidden("cannot remove your own admin role"));
    }

    let mut errors = FieldErrors::new();
    let email = match patch.email.as_deref() {
        Some(raw) => {
            let normalized = normalize_email(raw);
            if normalized.is_none() {
                errors.add("email", "Invalid email address.");
            }
            normalized
        }
        None => None,
    };
    if let Some(name) = &patch.name {
        errors.required("name", name, "Name is required");
    }
    if let Some(message) = patch.password.as_deref().and_then(validate_password_strength) {
        errors.add("password", message);
    }
    errors.finish()?;

    if let Some(email) = &email {
        if !ensure_email_free(backend, email, Some(id)).await? {
            let mut errors = FieldErrors::new();
            errors.add("email", "Email is already in use.");
            return Err(ActionError::Invalid(errors));
        }
    }

    let password_hash = match patch.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let changed = backend
        .members
        .update_member(
            id,
            MemberChanges {
                email,
                name: patch.name.map(|n| n.trim().to_owned()),
                role: patch.role,
                password_hash,
            },
        )
        .await
        .map_err(with_context("failed to update user"))?;
    if !changed {
        return Err(ActionError::not_found("member", id));
    }

    tracing::info!(member_id = %id, admin_id = %caller.id, "member updated");
    Ok(())
}

pub async fn delete(backend: &Backend, caller: Option<&Caller>, id: Uuid) -> Result<(), ActionError> {
    let caller = require_admin(caller)?;
    if id == caller.id {
        return Err(ActionError::Forbidden("cannot delete your own account"));
    }

    let deleted = backend
        .members
        .delete_member(id)
        .await
        .map_err(with_context("failed to delete user"))?;
    if !deleted {
        return Err(ActionError::not_found("member", id));
    }

    tracing::info!(member_id = %id, admin_id = %caller.id, "member deleted");
    Ok(())
}

#[cfg(test)]
#[path = "members_test.rs"]
mod tests;
