//! Connection routing
//!
//! `RwSplitter` classifies statements into reads and writes, `Resolver`
//! maps each operation to a connection, and `LoadBalancer` picks among the
//! members of a slave group.

mod resolver;
mod rw_split;
mod selector;

pub use resolver::{Resolver, RouteReason, RoutingDecision};
pub use rw_split::{Access, RwSplitter};
pub use selector::{
    BalanceError, ConnectionSelector, FirstSelector, LoadBalancer, RandomSelector,
    RoundRobinSelector, SequenceSelector,
};
