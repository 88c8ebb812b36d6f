//! Slave selection strategies
//!
//! A `LoadBalancer` picks one connection out of a group's members. The
//! strategy is pluggable; tests inject `SequenceSelector` or a seeded
//! `RandomSelector` to get deterministic picks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use thiserror::Error;

use crate::config::{BalancePolicy, BalancerConfig};
use crate::registry::Connection;

/// Strategy for selecting a connection from a list
pub trait ConnectionSelector: Send + Sync {
    /// Select a connection from the given list
    ///
    /// Returns None if the list is empty
    fn select<'a>(&self, members: &'a [Arc<Connection>]) -> Option<&'a Arc<Connection>>;
}

/// Select the first member
#[derive(Debug, Default)]
pub struct FirstSelector;

impl ConnectionSelector for FirstSelector {
    fn select<'a>(&self, members: &'a [Arc<Connection>]) -> Option<&'a Arc<Connection>> {
        members.first()
    }
}

/// Round-robin selection (default strategy)
///
/// One counter is shared by every group the balancer serves, so the walk
/// through a particular group is fair but not necessarily consecutive.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    counter: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }
}

impl ConnectionSelector for RoundRobinSelector {
    fn select<'a>(&self, members: &'a [Arc<Connection>]) -> Option<&'a Arc<Connection>> {
        if members.is_empty() {
            return None;
        }
        let idx = self.counter.fetch_add(1, Ordering::Relaxed) % members.len();
        members.get(idx)
    }
}

/// Uniform random selection
#[derive(Debug)]
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of picks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSelector for RandomSelector {
    fn select<'a>(&self, members: &'a [Arc<Connection>]) -> Option<&'a Arc<Connection>> {
        if members.is_empty() {
            return None;
        }
        let idx = self.rng.lock().gen_range(0..members.len());
        members.get(idx)
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted
///
/// Each index is taken modulo the member count, so a pick never falls
/// outside the given members.
#[derive(Debug)]
pub struct SequenceSelector {
    sequence: Vec<usize>,
    position: AtomicUsize,
}

impl SequenceSelector {
    pub fn new(sequence: impl Into<Vec<usize>>) -> Self {
        Self {
            sequence: sequence.into(),
            position: AtomicUsize::new(0),
        }
    }
}

impl ConnectionSelector for SequenceSelector {
    fn select<'a>(&self, members: &'a [Arc<Connection>]) -> Option<&'a Arc<Connection>> {
        if members.is_empty() {
            return None;
        }
        let step = if self.sequence.is_empty() {
            0
        } else {
            let pos = self.position.fetch_add(1, Ordering::Relaxed) % self.sequence.len();
            self.sequence[pos]
        };
        members.get(step % members.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("Cannot balance over an empty group")]
    EmptyGroup,
}

/// Picks one connection among a group's members
pub struct LoadBalancer {
    selector: Box<dyn ConnectionSelector>,
    /// Reuse the first pick for the lifetime of a scope frame
    sticky: bool,
}

impl LoadBalancer {
    /// Create a balancer with a custom selector
    pub fn new(selector: Box<dyn ConnectionSelector>) -> Self {
        Self {
            selector,
            sticky: false,
        }
    }

    pub fn from_config(config: &BalancerConfig) -> Self {
        let selector: Box<dyn ConnectionSelector> = match config.policy {
            BalancePolicy::RoundRobin => Box::new(RoundRobinSelector::new()),
            BalancePolicy::First => Box::new(FirstSelector),
            BalancePolicy::Random => match config.seed {
                Some(seed) => Box::new(RandomSelector::with_seed(seed)),
                None => Box::new(RandomSelector::new()),
            },
        };
        Self::new(selector).sticky(config.sticky)
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Pick one of `members`
    pub fn pick(&self, members: &[Arc<Connection>]) -> Result<Arc<Connection>, BalanceError> {
        self.selector
            .select(members)
            .cloned()
            .ok_or(BalanceError::EmptyGroup)
    }
}

impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new(Box::new(RoundRobinSelector::new()))
    }
}

impl std::fmt::Debug for LoadBalancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancer")
            .field("sticky", &self.sticky)
            .finish_non_exhaustive()
    }
}
