use std::fmt;
use std::sync::Arc;

use crate::registry::{Connection, SlaveGroup};

/// What a caller asks to route to inside a scope
///
/// Names are checked against the registry when the scope is entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Send reads to the master
    Master,
    /// Pin reads to one named connection (master or slave)
    Connection(String),
    /// Balance reads across a named slave group
    SlaveGroup(String),
}

impl Target {
    pub fn connection(name: impl Into<String>) -> Self {
        Self::Connection(name.into())
    }

    pub fn slave_group(name: impl Into<String>) -> Self {
        Self::SlaveGroup(name.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Master => f.write_str("master"),
            Target::Connection(name) => write!(f, "connection {}", name),
            Target::SlaveGroup(name) => write!(f, "slave group {}", name),
        }
    }
}

/// A validated routing override on the scope stack
#[derive(Debug, Clone)]
pub enum ScopeFrame {
    Master,
    Connection(Arc<Connection>),
    SlaveGroup(Arc<SlaveGroup>),
}

impl ScopeFrame {
    /// Metric/log label for the frame kind
    pub fn kind(&self) -> &'static str {
        match self {
            ScopeFrame::Master => "master",
            ScopeFrame::Connection(_) => "connection",
            ScopeFrame::SlaveGroup(_) => "slave_group",
        }
    }

    /// Name of the pinned connection or group
    pub fn name(&self) -> Option<&str> {
        match self {
            ScopeFrame::Master => None,
            ScopeFrame::Connection(conn) => Some(conn.name()),
            ScopeFrame::SlaveGroup(group) => Some(group.name()),
        }
    }

    /// The target this frame was entered with
    pub fn target(&self) -> Target {
        match self {
            ScopeFrame::Master => Target::Master,
            ScopeFrame::Connection(conn) => Target::connection(conn.name()),
            ScopeFrame::SlaveGroup(group) => Target::slave_group(group.name()),
        }
    }
}

impl fmt::Display for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target().fmt(f)
    }
}
