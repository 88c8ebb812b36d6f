//! Per-context routing session
//!
//! One `RoutingSession` per client connection, request or task. It owns the
//! context's scope stack and transaction state and shares the `Resolver`
//! with every other session.

mod state;

pub use state::SessionState;

use std::cell::RefCell;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::parser::{SqlClassifier, StatementType};
use crate::registry::Connection;
use crate::router::{Access, Resolver, RouteReason, RoutingDecision, RwSplitter};
use crate::scope::{ScopeError, ScopeGuard, ScopeStack, Target};

/// Routing front end for a single execution context
pub struct RoutingSession {
    /// Unique session ID
    pub id: u32,
    resolver: Arc<Resolver>,
    scope: ScopeStack,
    classifier: SqlClassifier,
    state: RefCell<SessionState>,
}

impl RoutingSession {
    pub fn new(id: u32, resolver: Arc<Resolver>) -> Self {
        let scope = resolver.scope();
        Self {
            id,
            resolver,
            scope,
            classifier: SqlClassifier::new(),
            state: RefCell::new(SessionState::new()),
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    /// Snapshot of the session state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn in_transaction(&self) -> bool {
        self.state.borrow().in_transaction
    }

    /// Resolve an already classified operation
    pub fn resolve(&self, access: Access) -> Arc<Connection> {
        self.resolver.resolve(access, &self.scope)
    }

    /// Resolve an already classified operation, with the reason
    pub fn decide(&self, access: Access) -> RoutingDecision {
        self.resolver.decide(access, &self.scope)
    }

    /// Classify SQL text, track transaction state, and route it
    ///
    /// Multi-statement text is routed as one unit: if any statement needs
    /// master, all of it goes there. Transaction boundaries are applied
    /// statement by statement. Text that cannot be classified is sent to
    /// master.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn route(&self, sql: &str) -> RoutingDecision {
        let stmt_types = self.classifier.classify_all(sql).unwrap_or_else(|e| {
            debug!(error = %e, "Unclassified statement, routing to master");
            vec![StatementType::Other]
        });

        let mut state = self.state.borrow_mut();
        let started_in_transaction = state.in_transaction;

        let mut access = Access::Read;
        for stmt_type in &stmt_types {
            if RwSplitter::route(*stmt_type, state.in_transaction).is_write() {
                access = Access::Write;
            }
            match stmt_type {
                StatementType::Begin => state.begin_transaction(),
                StatementType::Commit | StatementType::Rollback => state.end_transaction(),
                _ => {}
            }
        }

        let mut decision = self.resolver.decide(access, &self.scope);
        if started_in_transaction && stmt_types.iter().all(StatementType::is_read_only) {
            decision.reason = RouteReason::Transaction;
        }
        state.record_statement();

        debug!(
            stmt_types = ?stmt_types,
            connection = %decision.connection.name(),
            reason = %decision.reason,
            in_transaction = state.in_transaction,
            "Routed statement"
        );
        decision
    }

    /// Push `target` for as long as the returned guard lives
    pub fn enter(&self, target: Target) -> Result<ScopeGuard<'_>, ScopeError> {
        self.scope.enter(target)
    }

    /// Run `f` with `target` pushed, restoring the previous frame afterwards
    pub fn using<R, F>(&self, target: Target, f: F) -> Result<R, ScopeError>
    where
        F: FnOnce(&Self) -> R,
    {
        let _guard = self.scope.enter(target)?;
        Ok(f(self))
    }
}
