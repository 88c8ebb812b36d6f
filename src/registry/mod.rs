//! Connection registry
//!
//! Holds every named connection, the master, and the slave groups. Built once
//! from configuration and read-only afterwards, so it can be shared across
//! all sessions behind an `Arc` without locking.

mod builder;
mod connection;

pub use builder::RegistryBuilder;
pub use connection::{Connection, SlaveGroup};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConnectionConfig, ConnectionRole, SlaveGroupConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No master connection configured")]
    MissingMaster,
    #[error("Multiple master connections configured: {first}, {second}")]
    MultipleMasters { first: String, second: String },
    #[error("Connection {0} is defined more than once")]
    DuplicateConnection(String),
    #[error("Slave group {0} is defined more than once")]
    DuplicateGroup(String),
    #[error("Slave group {0} has no members")]
    EmptyGroup(String),
    #[error("Slave group {group} references unknown connection {member}")]
    UnknownMember { group: String, member: String },
    #[error("Slave group {group} lists connection {member} more than once")]
    DuplicateMember { group: String, member: String },
    #[error("Connection {connection} belongs to both {first} and {second}")]
    ConnectionInMultipleGroups {
        connection: String,
        first: String,
        second: String,
    },
    #[error("Multiple default slave groups: {first}, {second}")]
    MultipleDefaultGroups { first: String, second: String },
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),
    #[error("Unknown slave group: {0}")]
    UnknownGroup(String),
}

/// Read-only view of the routing topology
#[derive(Debug)]
pub struct Registry {
    master: Arc<Connection>,
    connections: HashMap<String, Arc<Connection>>,
    /// All slave-role connections, in configuration order
    slaves: Vec<Arc<Connection>>,
    groups: HashMap<String, Arc<SlaveGroup>>,
    default_group: Option<Arc<SlaveGroup>>,
}

impl Registry {
    /// Validate the configured connections and groups and build the registry
    pub fn from_config(
        connections: &[ConnectionConfig],
        groups: &[SlaveGroupConfig],
    ) -> Result<Self, RegistryError> {
        let mut master_name: Option<&str> = None;
        let mut known: HashSet<&str> = HashSet::with_capacity(connections.len());
        for conn in connections {
            if !known.insert(conn.name.as_str()) {
                return Err(RegistryError::DuplicateConnection(conn.name.clone()));
            }
            if conn.role == ConnectionRole::Master {
                if let Some(first) = master_name {
                    return Err(RegistryError::MultipleMasters {
                        first: first.to_string(),
                        second: conn.name.clone(),
                    });
                }
                master_name = Some(conn.name.as_str());
            }
        }
        let master_name = master_name.ok_or(RegistryError::MissingMaster)?;

        // Membership: connection name -> owning group name
        let mut membership: HashMap<&str, &str> = HashMap::new();
        let mut group_names: Vec<&str> = Vec::with_capacity(groups.len());
        let mut default_name: Option<&str> = None;
        for group in groups {
            if group_names.contains(&group.name.as_str()) {
                return Err(RegistryError::DuplicateGroup(group.name.clone()));
            }
            group_names.push(group.name.as_str());

            if group.members.is_empty() {
                return Err(RegistryError::EmptyGroup(group.name.clone()));
            }

            for member in &group.members {
                if !known.contains(member.as_str()) {
                    return Err(RegistryError::UnknownMember {
                        group: group.name.clone(),
                        member: member.clone(),
                    });
                }
                match membership.insert(member.as_str(), group.name.as_str()) {
                    Some(previous) if previous == group.name => {
                        return Err(RegistryError::DuplicateMember {
                            group: group.name.clone(),
                            member: member.clone(),
                        });
                    }
                    Some(previous) => {
                        return Err(RegistryError::ConnectionInMultipleGroups {
                            connection: member.clone(),
                            first: previous.to_string(),
                            second: group.name.clone(),
                        });
                    }
                    None => {}
                }
            }

            if group.default {
                if let Some(first) = default_name {
                    return Err(RegistryError::MultipleDefaultGroups {
                        first: first.to_string(),
                        second: group.name.clone(),
                    });
                }
                default_name = Some(group.name.as_str());
            }
        }

        let mut by_name = HashMap::with_capacity(connections.len());
        let mut slaves = Vec::new();
        for conn in connections {
            let group = membership.get(conn.name.as_str()).map(|g| g.to_string());
            let connection = Arc::new(Connection::from_config(conn, group));
            if connection.is_slave() {
                slaves.push(connection.clone());
            }
            debug!(
                name = %connection.name(),
                addr = %connection.addr(),
                role = ?connection.role(),
                group = ?connection.group(),
                "Registered connection"
            );
            by_name.insert(conn.name.clone(), connection);
        }

        let mut by_group = HashMap::with_capacity(groups.len());
        for group in groups {
            let members = group
                .members
                .iter()
                .filter_map(|m| by_name.get(m).cloned())
                .collect();
            let slave_group = Arc::new(SlaveGroup::new(group.name.clone(), members, group.default));
            by_group.insert(group.name.clone(), slave_group);
        }

        let master = by_name
            .get(master_name)
            .cloned()
            .ok_or(RegistryError::MissingMaster)?;
        let default_group = default_name.and_then(|name| by_group.get(name).cloned());

        info!(
            master = %master.name(),
            connections = by_name.len(),
            slaves = slaves.len(),
            groups = by_group.len(),
            default_group = ?default_group.as_ref().map(|g| g.name()),
            "Registry loaded"
        );

        Ok(Self {
            master,
            connections: by_name,
            slaves,
            groups: by_group,
            default_group,
        })
    }

    /// Start building a registry programmatically
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Get a connection by name
    pub fn connection(&self, name: &str) -> Result<&Arc<Connection>, RegistryError> {
        self.connections
            .get(name)
            .ok_or_else(|| RegistryError::UnknownConnection(name.to_string()))
    }

    /// Get a slave group by name
    pub fn group(&self, name: &str) -> Result<&Arc<SlaveGroup>, RegistryError> {
        self.groups
            .get(name)
            .ok_or_else(|| RegistryError::UnknownGroup(name.to_string()))
    }

    /// The group unscoped reads go to, if one is marked default
    pub fn default_group(&self) -> Option<&Arc<SlaveGroup>> {
        self.default_group.as_ref()
    }

    pub fn master(&self) -> &Arc<Connection> {
        &self.master
    }

    /// All slave connections, grouped or not, in configuration order
    pub fn slaves(&self) -> &[Arc<Connection>] {
        &self.slaves
    }

    pub fn has_slaves(&self) -> bool {
        !self.slaves.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get list of all group names (sorted)
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
