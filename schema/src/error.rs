//! Field table validation errors.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a field table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The table does not describe every wire field of its record.
    #[error("field table has {actual} descriptors, record declares {expected}")]
    FieldCountMismatch { expected: usize, actual: usize },

    /// Two descriptors share a name.
    #[error("duplicate field name `{name}`")]
    DuplicateField { name: &'static str },

    /// A variant rule names an index the table does not have.
    #[error("rule refers to field index {index}, table has {len} fields")]
    RuleIndexOutOfRange { index: usize, len: usize },

    /// A width override targets a float field.
    #[error("width override on float field `{name}`")]
    OverrideOnFloat { name: &'static str },
}
