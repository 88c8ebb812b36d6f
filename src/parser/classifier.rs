use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use thiserror::Error;
use tracing::debug;

/// Type of SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    /// `SELECT ... FOR UPDATE` / `FOR SHARE`
    LockingSelect,
    Insert,
    Update,
    Delete,
    Begin,
    Commit,
    Rollback,
    Set,
    Show,
    Use,
    /// `EXPLAIN` / `DESCRIBE`
    Explain,
    Other,
}

impl StatementType {
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            StatementType::Select | StatementType::Show | StatementType::Explain
        )
    }

    pub fn is_transaction_control(&self) -> bool {
        matches!(
            self,
            StatementType::Begin | StatementType::Commit | StatementType::Rollback
        )
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StatementType::Insert | StatementType::Update | StatementType::Delete
        )
    }

    /// The one of `self` and `other` that needs master more
    ///
    /// Any statement that is not read-only beats a read-only one; between
    /// two that are not, the earlier one is kept.
    pub fn stricter(self, other: StatementType) -> StatementType {
        if self.is_read_only() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to parse SQL: {0}")]
    ParseError(String),

    #[error("Empty statement")]
    EmptyStatement,
}

/// Classifies SQL text into a `StatementType`
///
/// Text is split into statements on `;` tokens, so separators inside string
/// literals or comments are not boundaries. Session and transaction
/// statements are recognised by their leading keyword; everything else goes
/// through the MySQL dialect parser.
pub struct SqlClassifier {
    dialect: MySqlDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Classify `sql` as a whole
    ///
    /// Multi-statement text is as strict as its strictest statement.
    pub fn classify(&self, sql: &str) -> Result<StatementType, ClassifyError> {
        self.classify_all(sql)?
            .into_iter()
            .reduce(StatementType::stricter)
            .ok_or(ClassifyError::EmptyStatement)
    }

    /// Classify every statement in `sql`, in order
    pub fn classify_all(&self, sql: &str) -> Result<Vec<StatementType>, ClassifyError> {
        let tokens = Tokenizer::new(&self.dialect, sql)
            .tokenize()
            .map_err(|e| ClassifyError::ParseError(e.to_string()))?;

        let mut stmt_types = Vec::new();
        for statement in Self::split_statements(tokens) {
            let stmt_type = self.classify_tokens(statement)?;
            debug!(stmt_type = ?stmt_type, "Classified statement");
            stmt_types.push(stmt_type);
        }

        if stmt_types.is_empty() {
            return Err(ClassifyError::EmptyStatement);
        }
        Ok(stmt_types)
    }

    /// Split a token stream on `;`, dropping statements that are only
    /// whitespace and comments
    fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
        let mut statements = Vec::new();
        let mut current = Vec::new();
        for token in tokens {
            match token {
                Token::SemiColon | Token::EOF => {
                    if current.iter().any(Self::is_significant) {
                        statements.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
                other => current.push(other),
            }
        }
        if current.iter().any(Self::is_significant) {
            statements.push(current);
        }
        statements
    }

    fn is_significant(token: &Token) -> bool {
        !matches!(token, Token::Whitespace(_))
    }

    fn classify_tokens(&self, tokens: Vec<Token>) -> Result<StatementType, ClassifyError> {
        if let Some(stmt_type) = Self::classify_by_keyword(&tokens) {
            return Ok(stmt_type);
        }

        let statement = Parser::new(&self.dialect)
            .with_tokens(tokens)
            .parse_statement()
            .map_err(|e| ClassifyError::ParseError(e.to_string()))?;
        Ok(Self::classify_statement(&statement))
    }

    fn classify_by_keyword(tokens: &[Token]) -> Option<StatementType> {
        // Unquoted words in order, skipping whitespace and comments; any
        // other token stands in as `None`
        let mut words = tokens
            .iter()
            .filter(|t| Self::is_significant(t))
            .map(|t| match t {
                Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_uppercase()),
                _ => None,
            });

        let keyword = words.next()??;
        match keyword.as_str() {
            "BEGIN" => Some(StatementType::Begin),
            "START" if words.next().flatten().as_deref() == Some("TRANSACTION") => {
                Some(StatementType::Begin)
            }
            "COMMIT" => Some(StatementType::Commit),
            "ROLLBACK" => {
                // Rolling back to a savepoint keeps the transaction open
                if words.any(|w| w.as_deref() == Some("TO")) {
                    Some(StatementType::Other)
                } else {
                    Some(StatementType::Rollback)
                }
            }
            "SET" => Some(StatementType::Set),
            "SHOW" => Some(StatementType::Show),
            "USE" => Some(StatementType::Use),
            "EXPLAIN" | "DESCRIBE" | "DESC" => Some(StatementType::Explain),
            _ => None,
        }
    }

    fn classify_statement(stmt: &Statement) -> StatementType {
        match stmt {
            Statement::Query(query) if !query.locks.is_empty() => StatementType::LockingSelect,
            Statement::Query(_) => StatementType::Select,
            Statement::Insert { .. } => StatementType::Insert,
            Statement::Update { .. } => StatementType::Update,
            Statement::Delete { .. } => StatementType::Delete,
            _ => StatementType::Other,
        }
    }
}
