//! Integration test entry point
//!
//! Run with: cargo test --test integration
//!
//! The topology mirrors `config/athena-router.toml`: the master and
//! slave21/slave31 sit on database `octopus_shard_1`, slave11/slave32 on
//! `octopus_shard_2`. Asserting on the database a read lands on is the
//! same check as counting rows written through the master.

mod config;
mod isolation;
mod slave_groups;

use std::path::PathBuf;
use std::sync::Arc;

use athena_router::{load_config, Connection, Registry, Resolver, RoutingSession};

/// Database the master writes to
pub const MASTER_DB: &str = "octopus_shard_1";
/// Database behind the default slave group
pub const DEFAULT_GROUP_DB: &str = "octopus_shard_2";

/// Path of a file under the crate's `config/` directory
pub fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join(name)
}

/// Resolver for the grouped-with-default topology
pub fn grouped_with_default() -> Arc<Resolver> {
    let config = load_config(config_path("athena-router.toml")).expect("Failed to load config");
    Arc::new(Resolver::from_config(&config).expect("Invalid topology"))
}

/// Fresh session on the grouped-with-default topology
pub fn session() -> RoutingSession {
    RoutingSession::new(1, grouped_with_default())
}

/// Database a connection points at
pub fn database_of(conn: &Connection) -> &str {
    conn.database().expect("Connection has no database")
}

/// Registry with one master, three slaves and no default group
pub fn ungrouped_registry() -> Arc<Registry> {
    Arc::new(
        Registry::builder()
            .master("master")
            .slave("s1")
            .slave("s2")
            .slave("s3")
            .group("only_s3", ["s3"])
            .build()
            .expect("Invalid topology"),
    )
}
