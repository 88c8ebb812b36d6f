use crate::config::{ConnectionConfig, ConnectionRole, SlaveGroupConfig};

use super::{Registry, RegistryError};

/// Programmatic registry construction
///
/// Goes through the same validation as a configuration file.
///
/// ```ignore
/// let registry = Registry::builder()
///     .master("master")
///     .slave("slave1")
///     .default_group("slaves", ["slave1"])
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    connections: Vec<ConnectionConfig>,
    groups: Vec<SlaveGroupConfig>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully specified connection
    pub fn connection(mut self, config: ConnectionConfig) -> Self {
        self.connections.push(config);
        self
    }

    pub fn master(self, name: impl Into<String>) -> Self {
        self.connection(ConnectionConfig::new(name, ConnectionRole::Master))
    }

    pub fn slave(self, name: impl Into<String>) -> Self {
        self.connection(ConnectionConfig::new(name, ConnectionRole::Slave))
    }

    /// Add a non-default slave group
    pub fn group<I, S>(self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_group(name.into(), members, false)
    }

    /// Add the slave group used for unscoped reads
    pub fn default_group<I, S>(self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_group(name.into(), members, true)
    }

    fn push_group<I, S>(mut self, name: String, members: I, default: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(SlaveGroupConfig {
            name,
            members: members.into_iter().map(Into::into).collect(),
            default,
        });
        self
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        Registry::from_config(&self.connections, &self.groups)
    }
}
