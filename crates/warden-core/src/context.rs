// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{UserId, UserProfile, UserWithRole};
use crate::rbac::{resolve_permissions, PermissionSet};

/// A request whose token verified and whose user was loaded.
///
/// Built fresh for every request; nothing in it outlives the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user with its role.
    pub user: UserWithRole,
    /// Permissions resolved from the role at load time.
    pub permissions: Arc<PermissionSet>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context, resolving the user's permissions.
    pub fn new(user: UserWithRole) -> Self {
        let permissions = Arc::new(resolve_permissions(&user));
        Self {
            user,
            permissions,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the user ID.
    pub fn user_id(&self) -> UserId {
        self.user.user.id
    }

    /// Returns the role name.
    pub fn role(&self) -> &str {
        &self.user.role.name
    }

    /// Returns `true` if the context has the given permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    /// Returns `true` if the context has every given permission.
    pub fn has_all_permissions<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.permissions.contains_all(names)
    }

    /// Builds the read-only profile view.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user.user.id,
            username: self.user.user.username.clone(),
            email: self.user.user.email.clone(),
            role: self.user.role.name.clone(),
            permissions: self.permissions.names().to_vec(),
        }
    }
}
