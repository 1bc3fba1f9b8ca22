// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-permission data model.
//!
//! Records ([`Permission`], [`Role`], [`User`]) reference each other by id.
//! [`UserWithRole`] is the fully resolved aggregate returned by
//! [`CredentialStore::load_user_with_role`](crate::store::CredentialStore::load_user_with_role).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the role assigned when registration does not request one.
pub const DEFAULT_ROLE: &str = "User";

/// Permissions granted to an auto-provisioned role, as `(name, description)`.
pub const BASELINE_PERMISSIONS: &[(&str, &str)] = &[
    ("read:profile", "Can read own profile"),
    ("update:profile", "Can update own profile"),
];

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an identifier from its string form.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`User`].
    UserId
);
define_id!(
    /// Identifier of a [`Role`].
    RoleId
);
define_id!(
    /// Identifier of a [`Permission`].
    PermissionId
);

// =============================================================================
// Records
// =============================================================================

/// A named permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission ID.
    pub id: PermissionId,
    /// Unique name, e.g. `read:profile`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// A role granting a set of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Unique name.
    pub name: String,
    /// Referenced permissions, in grant order.
    pub permissions: Vec<PermissionId>,
}

/// A registered user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// Argon2 PHC digest of the password.
    pub password_hash: String,
    /// The user's single role.
    pub role_id: RoleId,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Creation Inputs
// =============================================================================

/// Input for [`CredentialStore::create_permissions`](crate::store::CredentialStore::create_permissions).
#[derive(Debug, Clone)]
pub struct NewPermission {
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: String,
}

impl NewPermission {
    /// Creates a new permission input.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the baseline permission set for auto-provisioned roles.
    pub fn baseline() -> Vec<Self> {
        BASELINE_PERMISSIONS
            .iter()
            .map(|(name, description)| Self::new(*name, *description))
            .collect()
    }
}

/// Input for [`CredentialStore::create_role`](crate::store::CredentialStore::create_role).
#[derive(Debug, Clone)]
pub struct NewRole {
    /// Unique name.
    pub name: String,
    /// Referenced permissions, which must already exist.
    pub permissions: Vec<PermissionId>,
}

/// Input for [`CredentialStore::create_user`](crate::store::CredentialStore::create_user).
#[derive(Clone)]
pub struct NewUser {
    /// Unique username.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// Pre-computed password digest.
    pub password_hash: String,
    /// Existing role.
    pub role_id: RoleId,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Resolved Aggregate
// =============================================================================

/// A role with its permission records resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRole {
    /// Role ID.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Permission records, in grant order.
    pub permissions: Vec<Permission>,
}

/// A user with its role and permissions fully loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithRole {
    /// The user record.
    pub user: User,
    /// The user's resolved role.
    pub role: ResolvedRole,
}

impl UserWithRole {
    /// Returns the public projection of this user.
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.user.id,
            username: self.user.username.clone(),
            email: self.user.email.clone(),
            role: self.role.name.clone(),
        }
    }
}

// =============================================================================
// Projections
// =============================================================================

/// User fields safe to return to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// User ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Role name.
    pub role: String,
}

/// Read-only profile with the resolved permission names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Role name.
    pub role: String,
    /// Permission names granted via the role.
    pub permissions: Vec<String>,
}

// =============================================================================
// Protocol Requests and Responses
// =============================================================================

/// Registration request.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role; [`DEFAULT_ROLE`] when absent.
    #[serde(default, alias = "role_name")]
    pub role_name: Option<String>,
}

impl RegisterRequest {
    /// Creates a registration request for the default role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role_name: None,
        }
    }

    /// Requests a specific role.
    pub fn with_role(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_name", &self.role_name)
            .finish_non_exhaustive()
    }
}

/// Login request.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Result of a successful register or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthOutcome {
    /// Bearer token.
    pub token: String,
    /// Public view of the authenticated user.
    pub user: PublicUser,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_roundtrip() {
        let id = UserId::new();
        assert_eq!(UserId::parse(&id.to_string()), Some(id));
        assert_eq!(UserId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_baseline_permissions() {
        let names: Vec<String> = NewPermission::baseline().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["read:profile", "update:profile"]);
    }

    #[test]
    fn test_debug_hides_password_material() {
        let user = User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role_id: RoleId::new(),
            created_at: Utc::now(),
        };
        assert!(!format!("{:?}", user).contains("argon2id"));

        let request = LoginRequest::new("alice@x.com", "pw123");
        assert!(!format!("{:?}", request).contains("pw123"));
    }

    #[test]
    fn test_register_request_accepts_role_name_aliases() {
        let camel: RegisterRequest = serde_json::from_str(
            r#"{"username":"a","email":"a@x.com","password":"p","roleName":"Admin"}"#,
        )
        .unwrap();
        assert_eq!(camel.role_name.as_deref(), Some("Admin"));

        let snake: RegisterRequest = serde_json::from_str(
            r#"{"username":"a","email":"a@x.com","password":"p","role_name":"Admin"}"#,
        )
        .unwrap();
        assert_eq!(snake.role_name.as_deref(), Some("Admin"));

        let absent: RegisterRequest =
            serde_json::from_str(r#"{"username":"a","email":"a@x.com","password":"p"}"#).unwrap();
        assert!(absent.role_name.is_none());
    }

    #[test]
    fn test_public_view_omits_hash() {
        let role_id = RoleId::new();
        let aggregate = UserWithRole {
            user: User {
                id: UserId::new(),
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password_hash: "digest".to_string(),
                role_id,
                created_at: Utc::now(),
            },
            role: ResolvedRole {
                id: role_id,
                name: "User".to_string(),
                permissions: vec![],
            },
        };

        let json = serde_json::to_value(aggregate.public_view()).unwrap();
        assert_eq!(json["role"], "User");
        assert!(json.get("password_hash").is_none());
    }
}
