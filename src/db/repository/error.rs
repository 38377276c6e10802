//! Repository error type shared by every storage adapter.
//!
//! Errors carry a free-form message plus an [`ErrorContext`] naming the
//! operation, entity, and id involved. The retry loop in the Postgres
//! adapter consults [`RepositoryError::is_retryable`] to decide whether a
//! failed operation is worth another attempt.

use std::fmt;

/// Result alias used throughout the repository layer.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failure of a repository operation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or the pool handed out no
    /// connection. Always worth retrying.
    #[error("connection failure: {message}{context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// A statement failed to execute. Retryable only when the context says
    /// so (serialization failures, dropped connections).
    #[error("query failed: {message}{context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// The requested row does not exist.
    #[error("not found: {message}{context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Input rejected before it reached the store.
    #[error("invalid input: {message}{context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Bad or missing configuration, typically at startup.
    #[error("configuration error: {message}{context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A bug or an unclassifiable failure.
    #[error("internal error: {message}{context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },

    /// A transaction failed to commit or roll back.
    #[error("transaction failed: {message}{context}")]
    TransactionError {
        message: String,
        context: ErrorContext,
    },

    /// The store took too long to answer. Always worth retrying.
    #[error("timed out: {message}{context}")]
    TimeoutError {
        message: String,
        context: ErrorContext,
    },
}

/// Generates the `foo(message)` / `foo_with_context(message, context)`
/// constructor pair for one variant.
macro_rules! constructor_pair {
    ($(#[$doc:meta])* $plain:ident, $with_context:ident => $variant:ident) => {
        $(#[$doc])*
        pub fn $plain(message: impl Into<String>) -> Self {
            Self::$variant {
                message: message.into(),
                context: ErrorContext::default(),
            }
        }

        pub fn $with_context(message: impl Into<String>, context: ErrorContext) -> Self {
            Self::$variant {
                message: message.into(),
                context,
            }
        }
    };
}

impl RepositoryError {
    constructor_pair!(
        /// Connection-level failure (pool exhausted, store unreachable).
        connection, connection_with_context => ConnectionError
    );
    constructor_pair!(query, query_with_context => QueryError);
    constructor_pair!(not_found, not_found_with_context => NotFound);
    constructor_pair!(validation, validation_with_context => ValidationError);
    constructor_pair!(configuration, configuration_with_context => ConfigurationError);
    constructor_pair!(internal, internal_with_context => InternalError);
    constructor_pair!(transaction, transaction_with_context => TransactionError);
    constructor_pair!(timeout, timeout_with_context => TimeoutError);

    /// Whether retrying the failed operation could succeed.
    ///
    /// Connection and timeout failures are transient by nature. Query and
    /// transaction failures are transient only when the context flags them
    /// (for example a serialization failure inside a transaction).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError { .. } | Self::TimeoutError { .. } => true,
            Self::QueryError { context, .. } | Self::TransactionError { context, .. } => {
                context.retryable
            }
            _ => false,
        }
    }

    /// The context attached to this error.
    pub fn context(&self) -> &ErrorContext {
        let (Self::ConnectionError { context, .. }
        | Self::QueryError { context, .. }
        | Self::NotFound { context, .. }
        | Self::ValidationError { context, .. }
        | Self::ConfigurationError { context, .. }
        | Self::InternalError { context, .. }
        | Self::TransactionError { context, .. }
        | Self::TimeoutError { context, .. }) = self;
        context
    }

    /// Record the operation name on the attached context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        let (Self::ConnectionError { context, .. }
        | Self::QueryError { context, .. }
        | Self::NotFound { context, .. }
        | Self::ValidationError { context, .. }
        | Self::ConfigurationError { context, .. }
        | Self::InternalError { context, .. }
        | Self::TransactionError { context, .. }
        | Self::TimeoutError { context, .. }) = &mut self;
        context.operation = Some(operation.into());
        self
    }
}

/// Where and on what an error happened.
///
/// Rendered after the message as ` (op=..., entity=..., id=...)`; an empty
/// context renders as nothing.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: Option<String>,
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    /// Marks the owning error as transient for the retry loop.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("op", self.operation.as_deref()),
            ("entity", self.entity.as_deref()),
            ("id", self.entity_id.as_deref()),
            ("details", self.details.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = " (";
        for (key, value) in self.fields() {
            write!(f, "{}{}={}", separator, key, value)?;
            separator = ", ";
        }
        if separator == ", " {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl From<String> for RepositoryError {
    fn from(message: String) -> Self {
        RepositoryError::internal(message)
    }
}

impl From<&str> for RepositoryError {
    fn from(message: &str) -> Self {
        RepositoryError::internal(message.to_string())
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("record does not exist"),
            Error::DatabaseError(kind, info) => {
                // Serialization failures and dropped connections clear up on
                // retry; constraint violations and the rest do not.
                let transient = matches!(
                    kind,
                    DatabaseErrorKind::SerializationFailure
                        | DatabaseErrorKind::ClosedConnection
                );
                let mut context =
                    ErrorContext::default().with_details(format!("kind={:?}", kind));
                if transient {
                    context = context.retryable();
                }
                RepositoryError::query_with_context(info.message().to_string(), context)
            }
            Error::QueryBuilderError(e) => {
                RepositoryError::query(format!("query builder: {}", e))
            }
            Error::DeserializationError(e) => {
                RepositoryError::internal(format!("row deserialization: {}", e))
            }
            Error::SerializationError(e) => {
                RepositoryError::internal(format!("value serialization: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_context_fields() {
        let err = RepositoryError::not_found_with_context(
            "no active goal",
            ErrorContext::new("get_active_reading_goal")
                .with_entity("reading_goal")
                .with_entity_id(42),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("no active goal"));
        assert!(rendered.contains("op=get_active_reading_goal"));
        assert!(rendered.contains("entity=reading_goal"));
        assert!(rendered.contains("id=42"));
    }

    #[test]
    fn test_empty_context_renders_message_only() {
        let err = RepositoryError::validation("juz out of range");
        assert_eq!(err.to_string(), "invalid input: juz out of range");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RepositoryError::connection("pool exhausted").is_retryable());
        assert!(RepositoryError::timeout("no answer in 30s").is_retryable());
        assert!(!RepositoryError::query("syntax error").is_retryable());
        assert!(RepositoryError::query_with_context(
            "serialization failure",
            ErrorContext::default().retryable()
        )
        .is_retryable());
        assert!(!RepositoryError::not_found("no active goal").is_retryable());
        assert!(!RepositoryError::validation("juz out of range").is_retryable());
    }

    #[test]
    fn test_with_operation_updates_context() {
        let err = RepositoryError::internal("boom").with_operation("clear_all_data");
        assert_eq!(err.context().operation.as_deref(), Some("clear_all_data"));
    }
}
