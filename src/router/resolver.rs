//! Connection resolution
//!
//! Turns (access, innermost scope frame, registry) into one connection:
//!
//! - writes always go to master, whatever the scope
//! - `Master` frame: master
//! - `Connection` frame: that connection, no balancing
//! - `SlaveGroup` frame: balanced over the group
//! - no frame: default group, else every slave, else master

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::metrics::metrics;
use crate::registry::{Connection, Registry};
use crate::scope::{ScopeFrame, ScopeStack};

use super::rw_split::Access;
use super::selector::LoadBalancer;

/// Why a connection was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteReason {
    /// Write operation
    Write,
    /// Statement inside an explicit transaction
    Transaction,
    /// Read under a `Master` scope
    MasterScope,
    /// Read under an explicit connection scope
    ExplicitConnection,
    /// Read balanced over a scoped slave group
    SlaveGroup,
    /// Unscoped read balanced over the default group
    DefaultGroup,
    /// Unscoped read balanced over every slave
    AnySlave,
    /// Read with nowhere to go but master
    NoSlavesFallback,
}

impl RouteReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteReason::Write => "write",
            RouteReason::Transaction => "transaction",
            RouteReason::MasterScope => "master_scope",
            RouteReason::ExplicitConnection => "explicit_connection",
            RouteReason::SlaveGroup => "slave_group",
            RouteReason::DefaultGroup => "default_group",
            RouteReason::AnySlave => "any_slave",
            RouteReason::NoSlavesFallback => "no_slaves_fallback",
        }
    }
}

impl fmt::Display for RouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The connection one operation should run on
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub connection: Arc<Connection>,
    pub reason: RouteReason,
}

impl RoutingDecision {
    fn new(connection: Arc<Connection>, reason: RouteReason) -> Self {
        Self { connection, reason }
    }
}

/// Picks the connection for each operation
///
/// Shared by every execution context; the per-context state lives in the
/// `ScopeStack` passed to each call.
#[derive(Debug)]
pub struct Resolver {
    registry: Arc<Registry>,
    balancer: LoadBalancer,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>, balancer: LoadBalancer) -> Self {
        Self { registry, balancer }
    }

    /// Validate the topology and build a resolver from configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let registry = Registry::from_config(&config.connections, &config.slave_groups)?;
        let balancer = LoadBalancer::from_config(&config.balancer);
        debug!(
            policy = ?config.balancer.policy,
            sticky = config.balancer.sticky,
            "Balancer configured"
        );
        Ok(Self::new(Arc::new(registry), balancer))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn balancer(&self) -> &LoadBalancer {
        &self.balancer
    }

    /// Create an empty scope stack for a new execution context
    pub fn scope(&self) -> ScopeStack {
        ScopeStack::new(self.registry.clone())
    }

    /// Resolve the connection for one operation
    pub fn resolve(&self, access: Access, scope: &ScopeStack) -> Arc<Connection> {
        self.decide(access, scope).connection
    }

    /// Resolve the connection and report why it was chosen
    pub fn decide(&self, access: Access, scope: &ScopeStack) -> RoutingDecision {
        let decision = self.decide_inner(access, scope);
        metrics().record_route(decision.reason.as_str());
        debug!(
            access = ?access,
            connection = %decision.connection.name(),
            reason = %decision.reason,
            depth = scope.depth(),
            "Resolved connection"
        );
        decision
    }

    fn decide_inner(&self, access: Access, scope: &ScopeStack) -> RoutingDecision {
        if access.is_write() {
            return self.master(RouteReason::Write);
        }

        match scope.current() {
            Some(ScopeFrame::Master) => self.master(RouteReason::MasterScope),
            Some(ScopeFrame::Connection(conn)) => {
                RoutingDecision::new(conn, RouteReason::ExplicitConnection)
            }
            Some(ScopeFrame::SlaveGroup(group)) => {
                self.balance(group.members(), scope, RouteReason::SlaveGroup)
            }
            None => match self.registry.default_group() {
                Some(group) => self.balance(group.members(), scope, RouteReason::DefaultGroup),
                None => self.balance(self.registry.slaves(), scope, RouteReason::AnySlave),
            },
        }
    }

    fn balance(
        &self,
        members: &[Arc<Connection>],
        scope: &ScopeStack,
        reason: RouteReason,
    ) -> RoutingDecision {
        if members.is_empty() {
            metrics().record_no_slave_fallback();
            debug!(reason = %reason, "No slaves available, using master");
            return self.master(RouteReason::NoSlavesFallback);
        }

        let picked = if self.balancer.is_sticky() {
            scope.pinned_or_insert_with(|| self.pick(members))
        } else {
            self.pick(members)
        };

        match picked {
            Some(conn) => RoutingDecision::new(conn, reason),
            None => {
                metrics().record_no_slave_fallback();
                self.master(RouteReason::NoSlavesFallback)
            }
        }
    }

    fn pick(&self, members: &[Arc<Connection>]) -> Option<Arc<Connection>> {
        match self.balancer.pick(members) {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(error = %e, "Load balancer failed, using master");
                None
            }
        }
    }

    fn master(&self, reason: RouteReason) -> RoutingDecision {
        RoutingDecision::new(self.registry.master().clone(), reason)
    }
}
