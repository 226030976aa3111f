//! Authorization guards.
//!
//! Permissions are conjunctive: every listed permission must be held.
//! Roles are disjunctive: holding any one listed role is enough.

use std::collections::BTreeSet;

use crate::context::{resolve_current_user, CurrentUser, TokenContext};
use crate::error::{AuthError, Result};

/// Prefix marking a missing requirement as a role.
pub const ROLE_PREFIX: &str = "role:";

// ============================================================================
// Free functions
// ============================================================================

/// Resolve the current user without further checks.
///
/// # Errors
///
/// Propagates [`resolve_current_user`] failures.
pub fn require_current_user(ctx: &TokenContext) -> Result<CurrentUser> {
    resolve_current_user(ctx)
}

/// Require every permission in `required`.
///
/// # Errors
///
/// Propagates resolution failures, or `AuthError::Forbidden` with the sorted
/// missing permission names.
pub fn require_permissions(ctx: &TokenContext, required: &[&str]) -> Result<CurrentUser> {
    let user = resolve_current_user(ctx)?;
    check_permissions(&user, required)?;
    Ok(user)
}

/// Require at least one role in `required`.
///
/// No role can be held out of an empty list, so `&[]` is always forbidden
/// with an empty `required`.
///
/// # Errors
///
/// Propagates resolution failures, or `AuthError::Forbidden` listing every
/// required role as `role:<name>` when none is held.
pub fn require_roles(ctx: &TokenContext, required: &[&str]) -> Result<CurrentUser> {
    let user = resolve_current_user(ctx)?;
    check_roles(&user, required)?;
    Ok(user)
}

fn check_permissions(user: &CurrentUser, required: &[&str]) -> Result<()> {
    let missing: BTreeSet<&str> = required
        .iter()
        .copied()
        .filter(|p| !user.has_permission(p))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let required: Vec<String> = missing.into_iter().map(str::to_string).collect();
    forbidden(user, required)
}

fn check_roles(user: &CurrentUser, required: &[&str]) -> Result<()> {
    if required.iter().any(|r| user.has_role(r)) {
        return Ok(());
    }

    let missing: BTreeSet<&str> = required.iter().copied().collect();
    let required: Vec<String> = missing
        .into_iter()
        .map(|r| format!("{ROLE_PREFIX}{r}"))
        .collect();
    forbidden(user, required)
}

fn forbidden(user: &CurrentUser, required: Vec<String>) -> Result<()> {
    tracing::warn!(
        subject = %user.subject(),
        required = ?required,
        "Access denied"
    );
    Err(AuthError::Forbidden { required })
}

// ============================================================================
// Builder
// ============================================================================

/// A reusable authorization rule.
///
/// ```
/// use roster_auth::Guard;
///
/// let guard = Guard::authenticated()
///     .permissions(["student:read"])
///     .any_role(["teacher", "admin"]);
/// assert_eq!(guard.required_permissions(), ["student:read"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
    permissions: Vec<String>,
    roles: Vec<String>,
}

impl Guard {
    /// A guard that only requires an authenticated user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Additionally require every permission in `permissions`.
    #[must_use]
    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Additionally require at least one role in `roles`.
    #[must_use]
    pub fn any_role<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Required permissions.
    #[must_use]
    pub fn required_permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Accepted roles.
    #[must_use]
    pub fn accepted_roles(&self) -> &[String] {
        &self.roles
    }

    /// Resolve the current user and apply this guard.
    ///
    /// # Errors
    ///
    /// Resolution failures first, then missing permissions, then roles.
    pub fn authorize(&self, ctx: &TokenContext) -> Result<CurrentUser> {
        let user = resolve_current_user(ctx)?;
        self.check(&user)?;
        Ok(user)
    }

    /// Apply this guard to an already resolved user.
    ///
    /// # Errors
    ///
    /// `AuthError::Forbidden` for missing permissions, then missing roles.
    /// A guard without roles puts no constraint on them.
    pub fn check(&self, user: &CurrentUser) -> Result<()> {
        let permissions: Vec<&str> = self.permissions.iter().map(String::as_str).collect();
        check_permissions(user, &permissions)?;

        if self.roles.is_empty() {
            return Ok(());
        }
        let roles: Vec<&str> = self.roles.iter().map(String::as_str).collect();
        check_roles(user, &roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TokenError;
    use crate::error::TokenKind;
    use crate::jwt::Claims;

    fn ctx(roles: &[&str], permissions: &[&str]) -> TokenContext {
        TokenContext::with_claims(Claims {
            sub: "user-1".to_string(),
            iat: 0,
            exp: i64::MAX,
            iss: "roster-api".to_string(),
            aud: "roster-web".to_string(),
            roles: roles.iter().map(ToString::to_string).collect(),
            permissions: permissions.iter().map(ToString::to_string).collect(),
        })
    }

    fn forbidden_with(required: &[&str]) -> AuthError {
        AuthError::Forbidden {
            required: required.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn permissions_are_conjunctive_partial_holding_fails() {
        let err = require_permissions(&ctx(&[], &["a"]), &["a", "b"]).unwrap_err();
        assert_eq!(err, forbidden_with(&["b"]));
    }

    #[test]
    fn permissions_are_conjunctive_superset_passes() {
        let user = require_permissions(&ctx(&[], &["a", "b", "c"]), &["a", "b"]).unwrap();
        assert_eq!(user.subject().as_str(), "user-1");
    }

    #[test]
    fn missing_permissions_are_sorted_and_deduplicated() {
        let err = require_permissions(&ctx(&[], &[]), &["z", "a", "z"]).unwrap_err();
        assert_eq!(err, forbidden_with(&["a", "z"]));
    }

    #[test]
    fn roles_are_disjunctive_one_match_passes() {
        assert!(require_roles(&ctx(&["manager"], &[]), &["admin", "manager"]).is_ok());
    }

    #[test]
    fn roles_are_disjunctive_none_held_fails_with_prefixed_names() {
        let err = require_roles(&ctx(&[], &[]), &["manager", "admin"]).unwrap_err();
        assert_eq!(err, forbidden_with(&["role:admin", "role:manager"]));
    }

    #[test]
    fn empty_permission_list_passes() {
        assert!(require_permissions(&ctx(&[], &[]), &[]).is_ok());
    }

    #[test]
    fn empty_role_list_is_forbidden_even_with_roles_held() {
        assert_eq!(
            require_roles(&ctx(&[], &[]), &[]).unwrap_err(),
            forbidden_with(&[])
        );
        assert_eq!(
            require_roles(&ctx(&["admin"], &[]), &[]).unwrap_err(),
            forbidden_with(&[])
        );
    }

    #[test]
    fn guards_propagate_resolution_failures_unchanged() {
        let expired = TokenContext::with_error(TokenError::Expired);
        assert_eq!(
            require_permissions(&expired, &["a"]),
            Err(AuthError::TokenExpired {
                kind: TokenKind::Access
            })
        );
        assert_eq!(
            require_roles(&TokenContext::anonymous(), &["admin"]),
            Err(AuthError::TokenMissing {
                kind: TokenKind::Access
            })
        );
        assert!(require_current_user(&TokenContext::anonymous()).is_err());
    }

    #[test]
    fn builder_checks_permissions_before_roles() {
        let guard = Guard::authenticated()
            .permissions(["student:write"])
            .any_role(["teacher"]);

        let err = guard.authorize(&ctx(&[], &[])).unwrap_err();
        assert_eq!(err, forbidden_with(&["student:write"]));

        let err = guard.authorize(&ctx(&[], &["student:write"])).unwrap_err();
        assert_eq!(err, forbidden_with(&["role:teacher"]));

        assert!(guard
            .authorize(&ctx(&["teacher"], &["student:write"]))
            .is_ok());
    }

    #[test]
    fn authenticated_guard_only_requires_a_user() {
        let guard = Guard::authenticated();
        assert!(guard.authorize(&ctx(&[], &[])).is_ok());
        assert!(Guard::authenticated()
            .permissions(["x"])
            .authorize(&ctx(&[], &["x"]))
            .is_ok());
        assert!(matches!(
            guard.authorize(&TokenContext::anonymous()),
            Err(AuthError::TokenMissing { .. })
        ));
    }

    #[test]
    fn check_runs_on_resolved_user() {
        let user = resolve_current_user(&ctx(&["admin"], &["x"])).unwrap();
        let guard = Guard::authenticated().permissions(["x"]).any_role(["admin", "owner"]);
        assert!(guard.check(&user).is_ok());
        assert_eq!(guard.accepted_roles(), ["admin", "owner"]);
    }
}
