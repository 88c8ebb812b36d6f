//! Master/slave connection routing
//!
//! Decides which connection (master, a named slave, or a member of a slave
//! group) runs each database operation. Writes always go to master. Reads
//! follow the innermost scope of the calling context, then the default
//! slave group, then any slave, then master.
//!
//! ```ignore
//! let resolver = Arc::new(Resolver::from_config(&config)?);
//! let session = RoutingSession::new(1, resolver);
//!
//! session.using(Target::slave_group("slaves2"), |s| {
//!     let conn = s.resolve(Access::Read);
//! })?;
//! ```

pub mod config;
pub mod metrics;
pub mod parser;
pub mod registry;
pub mod router;
pub mod scope;
pub mod session;

pub use config::{load_config, Config, ConfigError};
pub use registry::{Connection, Registry, RegistryError, SlaveGroup};
pub use router::{Access, LoadBalancer, Resolver, RouteReason, RoutingDecision};
pub use scope::{ScopeError, ScopeFrame, ScopeGuard, ScopeStack, Target};
pub use session::RoutingSession;
