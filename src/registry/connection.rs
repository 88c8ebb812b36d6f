use std::fmt;
use std::sync::Arc;

use crate::config::{ConnectionConfig, ConnectionRole};

/// A named, already-established database connection
///
/// Immutable once the registry is built. Scope frames and routing decisions
/// hold it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    name: String,
    role: ConnectionRole,
    group: Option<String>,
    host: String,
    port: u16,
    user: String,
    password: String,
    database: Option<String>,
}

impl Connection {
    pub(crate) fn from_config(config: &ConnectionConfig, group: Option<String>) -> Self {
        Self {
            name: config.name.clone(),
            role: config.role,
            group,
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Name of the slave group this connection belongs to, if any
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Get the address string (host:port)
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_master(&self) -> bool {
        self.role == ConnectionRole::Master
    }

    pub fn is_slave(&self) -> bool {
        self.role == ConnectionRole::Slave
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named set of connections treated as one load-balancing unit
///
/// Members keep their configuration order; round-robin walks them in that
/// order. A group is never empty.
#[derive(Debug, Clone)]
pub struct SlaveGroup {
    name: String,
    members: Vec<Arc<Connection>>,
    is_default: bool,
}

impl SlaveGroup {
    pub(crate) fn new(name: String, members: Vec<Arc<Connection>>, is_default: bool) -> Self {
        Self {
            name,
            members,
            is_default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Arc<Connection>] {
        &self.members
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Check if a connection with this name is a member
    pub fn contains(&self, connection: &str) -> bool {
        self.members.iter().any(|m| m.name() == connection)
    }
}

impl fmt::Display for SlaveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
