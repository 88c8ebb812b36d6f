/// Session state tracking
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Whether the session is inside an explicit transaction
    pub in_transaction: bool,
    /// Number of statements routed so far
    pub statements_routed: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction
    pub fn begin_transaction(&mut self) {
        self.in_transaction = true;
    }

    /// End a transaction
    pub fn end_transaction(&mut self) {
        self.in_transaction = false;
    }

    pub fn record_statement(&mut self) {
        self.statements_routed += 1;
    }
}
