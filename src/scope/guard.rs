use tracing::debug;

use super::ScopeStack;

/// RAII handle for an entered scope
///
/// Dropping the guard restores the stack to the depth it had before the
/// scope was entered, whether the block finished, returned early through
/// `?`, or unwound from a panic.
#[must_use = "the scope is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    stack: &'a ScopeStack,
    /// Stack depth before the push
    depth: usize,
}

impl<'a> ScopeGuard<'a> {
    pub(super) fn new(stack: &'a ScopeStack, depth: usize) -> Self {
        Self { stack, depth }
    }

    /// Get the stack this guard belongs to
    pub fn stack(&self) -> &'a ScopeStack {
        self.stack
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        // Also discards frames of inner guards leaked with mem::forget
        self.stack.truncate(self.depth);
        debug!(depth = self.depth, "Scope exited");
    }
}
