// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory credential store.
//!
//! All records live behind one `parking_lot::RwLock`, so every uniqueness
//! check and the insert that follows it happen under the same write guard.
//! Data is lost when the store is dropped.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::CredentialStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    NewPermission, NewRole, NewUser, Permission, PermissionId, ResolvedRole, Role, RoleId, User,
    UserId, UserWithRole,
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    user_by_email: HashMap<String, UserId>,
    user_by_username: HashMap<String, UserId>,
    roles: HashMap<RoleId, Role>,
    role_by_name: HashMap<String, RoleId>,
    permissions: HashMap<PermissionId, Permission>,
    permission_by_name: HashMap<String, PermissionId>,
}

/// A thread-safe, non-persistent [`CredentialStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users.
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Returns the number of roles.
    pub fn role_count(&self) -> usize {
        self.inner.read().roles.len()
    }

    /// Returns the number of permissions.
    pub fn permission_count(&self) -> usize {
        self.inner.read().permissions.len()
    }

    /// Appends permissions to an existing role, skipping ones it already has.
    pub fn grant(&self, role_name: &str, permissions: &[PermissionId]) -> StoreResult<Role> {
        let mut inner = self.inner.write();

        if let Some(missing) = permissions
            .iter()
            .find(|id| !inner.permissions.contains_key(*id))
        {
            return Err(StoreError::missing_reference("permission", missing));
        }

        let role_id = *inner
            .role_by_name
            .get(role_name)
            .ok_or_else(|| StoreError::missing_reference("role", role_name))?;
        let role = inner
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| StoreError::missing_reference("role", role_id))?;

        for id in permissions {
            if !role.permissions.contains(id) {
                role.permissions.push(*id);
            }
        }

        Ok(role.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<User>> {
        let inner = self.inner.read();
        let id = inner
            .user_by_email
            .get(email)
            .or_else(|| inner.user_by_username.get(username));
        Ok(id.and_then(|id| inner.users.get(id)).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read();
        Ok(inner
            .user_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write();

        if inner.user_by_username.contains_key(&new.username) {
            return Err(StoreError::conflict("user", "username", new.username));
        }
        if inner.user_by_email.contains_key(&new.email) {
            return Err(StoreError::conflict("user", "email", new.email));
        }
        if !inner.roles.contains_key(&new.role_id) {
            return Err(StoreError::missing_reference("role", new.role_id));
        }

        let user = User {
            id: UserId::new(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role_id: new.role_id,
            created_at: Utc::now(),
        };

        inner.user_by_username.insert(user.username.clone(), user.id);
        inner.user_by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());

        debug!(user_id = %user.id, "User record created");
        Ok(user)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let inner = self.inner.read();
        Ok(inner
            .role_by_name
            .get(name)
            .and_then(|id| inner.roles.get(id))
            .cloned())
    }

    async fn create_role(&self, new: NewRole) -> StoreResult<Role> {
        let mut inner = self.inner.write();

        if inner.role_by_name.contains_key(&new.name) {
            return Err(StoreError::conflict("role", "name", new.name));
        }
        if let Some(missing) = new
            .permissions
            .iter()
            .find(|id| !inner.permissions.contains_key(*id))
        {
            return Err(StoreError::missing_reference("permission", missing));
        }

        let mut seen = HashSet::new();
        let permissions = new
            .permissions
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let role = Role {
            id: RoleId::new(),
            name: new.name,
            permissions,
        };

        inner.role_by_name.insert(role.name.clone(), role.id);
        inner.roles.insert(role.id, role.clone());

        debug!(role = %role.name, "Role record created");
        Ok(role)
    }

    async fn create_permissions(
        &self,
        new: Vec<NewPermission>,
    ) -> StoreResult<Vec<Permission>> {
        let mut inner = self.inner.write();

        {
            let mut batch = HashSet::new();
            for permission in &new {
                if inner.permission_by_name.contains_key(&permission.name)
                    || !batch.insert(permission.name.as_str())
                {
                    return Err(StoreError::conflict(
                        "permission",
                        "name",
                        permission.name.clone(),
                    ));
                }
            }
        }

        let created: Vec<Permission> = new
            .into_iter()
            .map(|p| Permission {
                id: PermissionId::new(),
                name: p.name,
                description: p.description,
            })
            .collect();

        for permission in &created {
            inner
                .permission_by_name
                .insert(permission.name.clone(), permission.id);
            inner.permissions.insert(permission.id, permission.clone());
        }

        debug!(count = created.len(), "Permission records created");
        Ok(created)
    }

    async fn find_permissions_by_name(&self, names: &[String]) -> StoreResult<Vec<Permission>> {
        let inner = self.inner.read();
        Ok(names
            .iter()
            .filter_map(|name| inner.permission_by_name.get(name))
            .filter_map(|id| inner.permissions.get(id))
            .cloned()
            .collect())
    }

    async fn load_user_with_role(&self, id: UserId) -> StoreResult<Option<UserWithRole>> {
        let inner = self.inner.read();

        let Some(user) = inner.users.get(&id) else {
            return Ok(None);
        };
        let role = inner
            .roles
            .get(&user.role_id)
            .ok_or_else(|| StoreError::missing_reference("role", user.role_id))?;

        let permissions = role
            .permissions
            .iter()
            .map(|pid| {
                inner
                    .permissions
                    .get(pid)
                    .cloned()
                    .ok_or_else(|| StoreError::missing_reference("permission", pid))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Some(UserWithRole {
            user: user.clone(),
            role: ResolvedRole {
                id: role.id,
                name: role.name.clone(),
                permissions,
            },
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_role(name: &str) -> (MemoryStore, Role) {
        let store = MemoryStore::new();
        let perms = store
            .create_permissions(NewPermission::baseline())
            .await
            .unwrap();
        let role = store
            .create_role(NewRole {
                name: name.to_string(),
                permissions: perms.iter().map(|p| p.id).collect(),
            })
            .await
            .unwrap();
        (store, role)
    }

    fn new_user(username: &str, email: &str, role_id: RoleId) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role_id,
        }
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let (store, role) = store_with_role("User").await;
        store
            .create_user(new_user("alice", "alice@x.com", role.id))
            .await
            .unwrap();

        let dup_email = store
            .create_user(new_user("alice2", "alice@x.com", role.id))
            .await
            .unwrap_err();
        assert!(matches!(dup_email, StoreError::Conflict { field: "email", .. }));

        let dup_username = store
            .create_user(new_user("alice", "other@x.com", role.id))
            .await
            .unwrap_err();
        assert!(matches!(dup_username, StoreError::Conflict { field: "username", .. }));

        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_or_username() {
        let (store, role) = store_with_role("User").await;
        let alice = store
            .create_user(new_user("alice", "alice@x.com", role.id))
            .await
            .unwrap();

        let by_email = store
            .find_user_by_email_or_username("alice@x.com", "nobody")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(alice.id));

        let by_username = store
            .find_user_by_email_or_username("nobody@x.com", "alice")
            .await
            .unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(alice.id));

        assert!(store
            .find_user_by_email_or_username("nobody@x.com", "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_user_requires_existing_role() {
        let store = MemoryStore::new();
        let err = store
            .create_user(new_user("alice", "alice@x.com", RoleId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "role", .. }));
    }

    #[tokio::test]
    async fn test_role_name_unique() {
        let (store, _) = store_with_role("User").await;
        let err = store
            .create_role(NewRole {
                name: "User".to_string(),
                permissions: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.role_count(), 1);
    }

    #[tokio::test]
    async fn test_create_permissions_is_all_or_nothing() {
        let (store, _) = store_with_role("User").await;
        let err = store
            .create_permissions(vec![
                NewPermission::new("write:posts", "Can write posts"),
                NewPermission::new("read:profile", "duplicate"),
            ])
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.permission_count(), 2);

        let found = store
            .find_permissions_by_name(&["write:posts".to_string()])
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_load_user_with_role_resolves_permissions_in_order() {
        let (store, role) = store_with_role("User").await;
        let alice = store
            .create_user(new_user("alice", "alice@x.com", role.id))
            .await
            .unwrap();

        let loaded = store.load_user_with_role(alice.id).await.unwrap().unwrap();
        let names: Vec<&str> = loaded
            .role
            .permissions
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(loaded.role.name, "User");
        assert_eq!(names, vec!["read:profile", "update:profile"]);

        assert!(store.load_user_with_role(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_grant_extends_role() {
        let (store, _) = store_with_role("User").await;
        let extra = store
            .create_permissions(vec![NewPermission::new("admin:users", "Manage users")])
            .await
            .unwrap();

        let role = store.grant("User", &[extra[0].id, extra[0].id]).unwrap();
        assert_eq!(role.permissions.len(), 3);

        assert!(store.grant("Nope", &[extra[0].id]).is_err());
    }
}
