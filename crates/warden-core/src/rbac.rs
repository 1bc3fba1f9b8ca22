// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization resolver.
//!
//! A user's effective permissions are exactly the permissions of its single
//! role. Checks use AND semantics: every required name must be granted.

use std::collections::HashSet;

use serde::Serialize;

use crate::context::AuthContext;
use crate::error::{AuthError, AuthResult};
use crate::model::UserWithRole;

// =============================================================================
// PermissionSet
// =============================================================================

/// The permission names granted to a user.
///
/// Keeps grant order for display while answering membership in O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet {
    #[serde(skip)]
    index: HashSet<String>,
    ordered: Vec<String>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from names, dropping repeats.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for name in names {
            set.add(name);
        }
        set
    }

    /// Adds a permission name. Returns `false` if it was already present.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains(&name) {
            return false;
        }
        self.index.insert(name.clone());
        self.ordered.push(name);
        true
    }

    /// Returns `true` if the set grants `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Returns `true` if the set grants every name in `required`.
    pub fn contains_all<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|name| self.contains(name.as_ref()))
    }

    /// Returns the required names the set does not grant.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.contains(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect()
    }

    /// Returns the names in grant order.
    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    /// Returns the number of permissions.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if no permission is granted.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the permission names attached to the user's role.
pub fn resolve_permissions(user: &UserWithRole) -> PermissionSet {
    PermissionSet::from_names(user.role.permissions.iter().map(|p| p.name.as_str()))
}

/// Returns `true` iff the user holds every permission in `required`.
///
/// An empty `required` list is always satisfied.
pub fn has_permission<S: AsRef<str>>(user: &UserWithRole, required: &[S]) -> bool {
    resolve_permissions(user).contains_all(required)
}

/// Checks a request context against the required permissions.
///
/// `None` means no authenticated user and yields
/// [`AuthError::AuthenticationRequired`].
pub fn authorize<S: AsRef<str>>(context: Option<&AuthContext>, required: &[S]) -> AuthResult<()> {
    let context = context.ok_or(AuthError::AuthenticationRequired)?;
    let missing = context.permissions.missing(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::forbidden(missing))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Permission, PermissionId, ResolvedRole, RoleId, User, UserId};
    use chrono::Utc;

    fn user_with(permissions: &[&str]) -> UserWithRole {
        let role_id = RoleId::new();
        UserWithRole {
            user: User {
                id: UserId::new(),
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: String::new(),
                role_id,
                created_at: Utc::now(),
            },
            role: ResolvedRole {
                id: role_id,
                name: "User".to_string(),
                permissions: permissions
                    .iter()
                    .map(|name| Permission {
                        id: PermissionId::new(),
                        name: name.to_string(),
                        description: String::new(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_and_semantics() {
        let user = user_with(&["read:profile", "update:profile"]);

        assert!(has_permission(&user, &["read:profile"]));
        assert!(has_permission(&user, &["read:profile", "update:profile"]));
        assert!(!has_permission(&user, &["read:profile", "admin:users"]));
    }

    #[test]
    fn test_empty_requirement_is_satisfied() {
        let none: [&str; 0] = [];
        assert!(has_permission(&user_with(&[]), &none));
        assert!(has_permission(&user_with(&["read:profile"]), &none));
    }

    #[test]
    fn test_user_without_permissions_fails_non_empty_check() {
        assert!(!has_permission(&user_with(&[]), &["read:profile"]));
    }

    #[test]
    fn test_resolve_keeps_grant_order() {
        let user = user_with(&["update:profile", "read:profile", "update:profile"]);
        let set = resolve_permissions(&user);
        assert_eq!(set.names(), &["update:profile", "read:profile"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_authorize() {
        let ctx = AuthContext::new(user_with(&["read:profile"]));

        assert!(authorize(Some(&ctx), &["read:profile"]).is_ok());
        assert!(matches!(
            authorize(None, &["read:profile"]),
            Err(AuthError::AuthenticationRequired)
        ));

        match authorize(Some(&ctx), &["read:profile", "admin:users"]) {
            Err(AuthError::Forbidden { missing }) => assert_eq!(missing, vec!["admin:users"]),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
