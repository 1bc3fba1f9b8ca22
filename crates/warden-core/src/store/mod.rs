// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential store abstraction.
//!
//! The protocol never talks to a database directly; it goes through
//! [`CredentialStore`]. Implementations must enforce the uniqueness
//! constraints atomically and report violations as [`StoreError::Conflict`].
//!
//! [`StoreError::Conflict`]: crate::error::StoreError::Conflict

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{NewPermission, NewRole, NewUser, Permission, Role, User, UserId, UserWithRole};

/// Persistence for users, roles, and permissions.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds a user whose email OR username matches.
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<User>>;

    /// Finds a user by email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a user.
    ///
    /// Fails with `Conflict` if the username or email is taken, and with
    /// `MissingReference` if the role does not exist.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Finds a role by name.
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Creates a role.
    ///
    /// Fails with `Conflict` if the name is taken, and with
    /// `MissingReference` if a referenced permission does not exist.
    async fn create_role(&self, role: NewRole) -> StoreResult<Role>;

    /// Creates permissions, all or nothing.
    ///
    /// Fails with `Conflict` if any name already exists or repeats within
    /// the batch.
    async fn create_permissions(&self, permissions: Vec<NewPermission>)
        -> StoreResult<Vec<Permission>>;

    /// Returns the permissions whose names are listed. Unknown names are skipped.
    async fn find_permissions_by_name(&self, names: &[String]) -> StoreResult<Vec<Permission>>;

    /// Loads a user with its role and permissions fully resolved.
    async fn load_user_with_role(&self, id: UserId) -> StoreResult<Option<UserWithRole>>;
}
