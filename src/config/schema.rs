use serde::Deserialize;

/// Routing topology and balancing policy
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Load balancing policy for slave reads
    #[serde(default)]
    pub balancer: BalancerConfig,
    /// Every named connection: exactly one master plus any number of slaves
    pub connections: Vec<ConnectionConfig>,
    /// Named slave groups
    #[serde(default)]
    pub slave_groups: Vec<SlaveGroupConfig>,
}

// ============================================================================
// Connection / SlaveGroup Configuration
// ============================================================================

/// A single named database connection
///
/// The name is what scopes refer to (`using connection slave21`). The
/// endpoint fields are carried through to the resolved connection untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Unique connection name
    pub name: String,
    /// Connection role
    pub role: ConnectionRole,
    /// Hostname or IP
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username
    #[serde(default = "default_user")]
    pub user: String,
    /// Password
    #[serde(default)]
    pub password: String,
    /// Default database
    #[serde(default)]
    pub database: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

impl ConnectionConfig {
    /// Connection with default endpoint settings
    pub fn new(name: impl Into<String>, role: ConnectionRole) -> Self {
        Self {
            name: name.into(),
            role,
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: None,
        }
    }

    /// Set the default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// Role of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Master,
    Slave,
}

/// A named set of connections balanced as one unit
#[derive(Debug, Clone, Deserialize)]
pub struct SlaveGroupConfig {
    /// Unique group name
    pub name: String,
    /// Member connection names, in balancing order
    pub members: Vec<String>,
    /// Whether unscoped reads go to this group
    #[serde(default)]
    pub default: bool,
}

// ============================================================================
// Balancer Configuration
// ============================================================================

/// Slave selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    #[default]
    RoundRobin,
    Random,
    First,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalancerConfig {
    #[serde(default)]
    pub policy: BalancePolicy,
    /// Seed for the random policy (entropy-seeded when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Keep the first pick for the lifetime of a scope frame
    #[serde(default)]
    pub sticky: bool,
}
