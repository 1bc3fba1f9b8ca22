// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`CredentialStore`] doubles that wrap a [`MemoryStore`] and inject
//! failures or interleavings the real store never produces on its own.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use warden_core::{
    CredentialStore, MemoryStore, NewPermission, NewRole, NewUser, Permission, Role, StoreError,
    StoreResult, User, UserId, UserWithRole,
};

// =============================================================================
// FlakyStore
// =============================================================================

/// A store that fails every call with [`StoreError::Unavailable`] while
/// switched off.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyStore {
    /// Creates a healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that starts out failing.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_failing(true);
        store
    }

    /// Turns failure injection on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }

    /// Returns how many store calls were made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<User>> {
        self.check()?;
        self.inner.find_user_by_email_or_username(email, username).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        self.inner.find_user_by_email(email).await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.check()?;
        self.inner.create_user(user).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.check()?;
        self.inner.find_role_by_name(name).await
    }

    async fn create_role(&self, role: NewRole) -> StoreResult<Role> {
        self.check()?;
        self.inner.create_role(role).await
    }

    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> StoreResult<Vec<Permission>> {
        self.check()?;
        self.inner.create_permissions(permissions).await
    }

    async fn find_permissions_by_name(&self, names: &[String]) -> StoreResult<Vec<Permission>> {
        self.check()?;
        self.inner.find_permissions_by_name(names).await
    }

    async fn load_user_with_role(&self, id: UserId) -> StoreResult<Option<UserWithRole>> {
        self.check()?;
        self.inner.load_user_with_role(id).await
    }
}

// =============================================================================
// RacingRoleStore
// =============================================================================

/// A store that loses the role-creation race once.
///
/// The first `find_role_by_name` reports the role as absent, then creates it
/// on behalf of a simulated rival request before returning. The caller's own
/// `create_role` therefore hits a `Conflict`.
#[derive(Debug, Default)]
pub struct RacingRoleStore {
    inner: Arc<MemoryStore>,
    raced: AtomicBool,
    role_lookups: AtomicUsize,
    role_creates: AtomicUsize,
}

impl RacingRoleStore {
    /// Creates a store that has not raced yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }

    /// Returns how many role lookups were made.
    pub fn role_lookups(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst)
    }

    /// Returns how many role creations were attempted by callers.
    pub fn role_creates(&self) -> usize {
        self.role_creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for RacingRoleStore {
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<User>> {
        self.inner.find_user_by_email_or_username(email, username).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.inner.create_user(user).await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.role_lookups.fetch_add(1, Ordering::SeqCst);

        if !self.raced.swap(true, Ordering::SeqCst) {
            // The rival commits between our read and our write.
            self.inner
                .create_role(NewRole {
                    name: name.to_string(),
                    permissions: Vec::new(),
                })
                .await?;
            return Ok(None);
        }

        self.inner.find_role_by_name(name).await
    }

    async fn create_role(&self, role: NewRole) -> StoreResult<Role> {
        self.role_creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_role(role).await
    }

    async fn create_permissions(
        &self,
        permissions: Vec<NewPermission>,
    ) -> StoreResult<Vec<Permission>> {
        self.inner.create_permissions(permissions).await
    }

    async fn find_permissions_by_name(&self, names: &[String]) -> StoreResult<Vec<Permission>> {
        self.inner.find_permissions_by_name(names).await
    }

    async fn load_user_with_role(&self, id: UserId) -> StoreResult<Option<UserWithRole>> {
        self.inner.load_user_with_role(id).await
    }
}
