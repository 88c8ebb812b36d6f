//! Per-context routing scopes
//!
//! A `ScopeStack` holds the routing overrides of one execution context
//! (a client session, a request, a task). The innermost frame wins. Stacks
//! are `Send` so they can travel with their context, but not `Sync`: two
//! contexts never share one.

mod frame;
mod guard;

pub use frame::{ScopeFrame, Target};
pub use guard::ScopeGuard;

use std::cell::RefCell;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::metrics::metrics;
use crate::registry::{Connection, Registry, RegistryError};

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Unknown routing target {target}: {source}")]
    UnknownTarget {
        target: Target,
        #[source]
        source: RegistryError,
    },
    #[error("Scope stack is empty")]
    EmptyStack,
}

#[derive(Debug)]
struct Entry {
    frame: ScopeFrame,
    /// Sticky pick made under this frame
    pin: Option<Arc<Connection>>,
}

/// Stack of routing overrides for one execution context
#[derive(Debug)]
pub struct ScopeStack {
    registry: Arc<Registry>,
    frames: RefCell<Vec<Entry>>,
    /// Sticky pick made while no frame is active
    root_pin: RefCell<Option<Arc<Connection>>>,
}

impl ScopeStack {
    /// Create an empty stack validating targets against `registry`
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            frames: RefCell::new(Vec::new()),
            root_pin: RefCell::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Push a routing override
    ///
    /// Fails with `UnknownTarget` if the named connection or group is not in
    /// the registry; the stack is left unchanged in that case.
    pub fn push(&self, target: Target) -> Result<(), ScopeError> {
        let frame = match self.lookup(&target) {
            Ok(frame) => frame,
            Err(e) => {
                metrics().record_scope_rejected();
                debug!(target = %target, error = %e, "Rejected scope push");
                return Err(e);
            }
        };

        metrics().record_scope_push(frame.kind());
        let mut frames = self.frames.borrow_mut();
        frames.push(Entry { frame, pin: None });
        debug!(target = %target, depth = frames.len(), "Scope entered");
        Ok(())
    }

    pub fn push_master(&self) -> Result<(), ScopeError> {
        self.push(Target::Master)
    }

    pub fn push_connection(&self, name: &str) -> Result<(), ScopeError> {
        self.push(Target::connection(name))
    }

    pub fn push_slave_group(&self, name: &str) -> Result<(), ScopeError> {
        self.push(Target::slave_group(name))
    }

    /// Remove the innermost frame, exposing the one beneath it
    ///
    /// Popping an empty stack is an error and leaves it empty.
    pub fn pop(&self) -> Result<ScopeFrame, ScopeError> {
        self.frames
            .borrow_mut()
            .pop()
            .map(|entry| entry.frame)
            .ok_or(ScopeError::EmptyStack)
    }

    /// The innermost frame, or `None` when no override is active
    pub fn current(&self) -> Option<ScopeFrame> {
        self.frames.borrow().last().map(|entry| entry.frame.clone())
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// Push `target` and return a guard that pops it when dropped
    pub fn enter(&self, target: Target) -> Result<ScopeGuard<'_>, ScopeError> {
        let depth = self.depth();
        self.push(target)?;
        Ok(ScopeGuard::new(self, depth))
    }

    /// Run `f` with `target` pushed; the previous frame is restored on every
    /// exit path out of `f`
    pub fn using<R, F>(&self, target: Target, f: F) -> Result<R, ScopeError>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.enter(target)?;
        Ok(f())
    }

    pub(crate) fn truncate(&self, depth: usize) {
        self.frames.borrow_mut().truncate(depth);
    }

    /// Return the sticky pick of the innermost frame, making one with `pick`
    /// if there is none yet
    pub(crate) fn pinned_or_insert_with<F>(&self, pick: F) -> Option<Arc<Connection>>
    where
        F: FnOnce() -> Option<Arc<Connection>>,
    {
        let existing = match self.frames.borrow().last() {
            Some(entry) => entry.pin.clone(),
            None => self.root_pin.borrow().clone(),
        };
        if existing.is_some() {
            return existing;
        }

        let picked = pick()?;
        match self.frames.borrow_mut().last_mut() {
            Some(entry) => entry.pin = Some(picked.clone()),
            None => *self.root_pin.borrow_mut() = Some(picked.clone()),
        }
        Some(picked)
    }

    fn lookup(&self, target: &Target) -> Result<ScopeFrame, ScopeError> {
        let frame = match target {
            Target::Master => Ok(ScopeFrame::Master),
            Target::Connection(name) => self
                .registry
                .connection(name)
                .map(|conn| ScopeFrame::Connection(conn.clone())),
            Target::SlaveGroup(name) => self
                .registry
                .group(name)
                .map(|group| ScopeFrame::SlaveGroup(group.clone())),
        };
        frame.map_err(|source| ScopeError::UnknownTarget {
            target: target.clone(),
            source,
        })
    }
}
