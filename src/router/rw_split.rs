use crate::parser::StatementType;

/// Read/write classification of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// May be served by a slave
    Read,
    /// Must go to master
    Write,
}

impl Access {
    pub fn from_is_write(is_write: bool) -> Self {
        if is_write {
            Access::Write
        } else {
            Access::Read
        }
    }

    pub fn is_write(&self) -> bool {
        *self == Access::Write
    }
}

/// Read-write splitter
pub struct RwSplitter;

impl RwSplitter {
    /// Determine access based on statement type and transaction state
    ///
    /// # Arguments
    /// * `stmt_type` - Type of SQL statement
    /// * `in_transaction` - Whether the session is in a transaction
    pub fn route(stmt_type: StatementType, in_transaction: bool) -> Access {
        // Always use master when in transaction
        if in_transaction {
            return Access::Write;
        }

        match stmt_type {
            // Read-only operations can go to slave
            StatementType::Select | StatementType::Show | StatementType::Explain => Access::Read,

            // Locking reads and writes must go to master
            StatementType::LockingSelect
            | StatementType::Insert
            | StatementType::Update
            | StatementType::Delete
            | StatementType::Begin
            | StatementType::Commit
            | StatementType::Rollback => Access::Write,

            // Other operations go to master for safety
            StatementType::Set | StatementType::Use | StatementType::Other => Access::Write,
        }
    }

    /// Check if a statement may be served by a slave
    pub fn can_use_slave(stmt_type: StatementType, in_transaction: bool) -> bool {
        Self::route(stmt_type, in_transaction) == Access::Read
    }
}
