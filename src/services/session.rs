use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::models::{AdminIdentity, UserIdentity, ADMIN_ROLE};

pub const USER_ID: &str = "userId";
pub const USER_EMAIL: &str = "userEmail";
pub const USER_TOKEN: &str = "userToken";
pub const ADMIN_ID: &str = "adminId";
pub const ADMIN_EMAIL: &str = "adminEmail";
pub const ADMIN_ROLE_KEY: &str = "adminRole";
pub const ADMIN_TOKEN: &str = "adminToken";

/// Durable string key/value storage for the signed-in identity.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("session database lock poisoned"))?;
        f(&conn)
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.with_conn(|conn| {
            queries::get_session_value(conn, key)
                .with_context(|| format!("failed to read session key {key}"))
        })
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.with_conn(|conn| {
            queries::set_session_value(conn, key, value)
                .with_context(|| format!("failed to write session key {key}"))
        })
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.with_conn(|conn| {
            queries::delete_session_value(conn, key)
                .with_context(|| format!("failed to remove session key {key}"))?;
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// Typed view over a [`SessionStore`] using the fixed key names.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current user identity. An unreadable or non-numeric id counts as signed out.
    pub fn user(&self) -> Option<UserIdentity> {
        let id = self.read_id(USER_ID)?;
        Some(UserIdentity {
            id,
            email: self.read(USER_EMAIL),
            token: self.read(USER_TOKEN),
        })
    }

    pub fn admin(&self) -> Option<AdminIdentity> {
        if self.read(ADMIN_ROLE_KEY).as_deref() != Some(ADMIN_ROLE) {
            return None;
        }
        let id = self.read_id(ADMIN_ID)?;
        Some(AdminIdentity {
            id,
            email: self.read(ADMIN_EMAIL),
            token: self.read(ADMIN_TOKEN),
        })
    }

    pub fn save_user(&self, identity: &UserIdentity) -> anyhow::Result<()> {
        self.store.set(USER_ID, &identity.id.to_string())?;
        self.write_optional(USER_EMAIL, identity.email.as_deref())?;
        self.write_optional(USER_TOKEN, identity.token.as_deref())?;
        Ok(())
    }

    pub fn save_admin(&self, identity: &AdminIdentity) -> anyhow::Result<()> {
        self.store.set(ADMIN_ID, &identity.id.to_string())?;
        self.write_optional(ADMIN_EMAIL, identity.email.as_deref())?;
        self.store.set(ADMIN_ROLE_KEY, ADMIN_ROLE)?;
        self.write_optional(ADMIN_TOKEN, identity.token.as_deref())?;
        Ok(())
    }

    pub fn clear_user(&self) -> anyhow::Result<()> {
        for key in [USER_ID, USER_EMAIL, USER_TOKEN] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    pub fn clear_admin(&self) -> anyhow::Result<()> {
        for key in [ADMIN_ID, ADMIN_EMAIL, ADMIN_ROLE_KEY, ADMIN_TOKEN] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key, "failed to read session value");
                None
            }
        }
    }

    fn read_id(&self, key: &str) -> Option<i64> {
        self.read(key)?.trim().parse().ok()
    }

    fn write_optional(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        match value {
            Some(v) => self.store.set(key, v),
            None => self.store.remove(key),
        }
    }
}
