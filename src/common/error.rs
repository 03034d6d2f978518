// Compile Error Types
//
// Every fallible operation in the compiler reports a `CompileError` carrying a
// stable SQLSTATE-style code. No operation signals failure with a sentinel.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable state codes reported by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlState {
    /// Statement only has parse-time effect and must not be bound
    ParseOnly,
    /// A node was asked to generate code it cannot produce
    UnableToGenerate,
    /// The generator cannot supply the requested activation support
    UnavailableActivationNeed,
    /// Internal invariant or phase-ordering violation
    InternalError,
    SchemaDoesNotExist,
    TableNotFound,
    ColumnNotFound,
    AmbiguousColumnName,
    DuplicateTableName,
    NotComparable,
    NonBooleanWhereClause,
    BothOperandsParameters,
    NoDdlInSystemSchema,
    ObjectDoesNotExist,
    DropViewOnNonView,
    InvalidOperationOnView,
    NoSuchFunction,
    AggregateBadType,
    NoAggregatesInWhereClause,
    AggregateContainsAggregate,
    ColumnNotInNonGroupedSelect,
    ColumnNotInGroupedSelect,
    LogicalNonBoolean,
    BinaryOperatorNotSupported,
    NoSuchWindow,
}

impl SqlState {
    /// Five character code, as reported to the session layer
    pub fn code(&self) -> &'static str {
        match self {
            SqlState::ParseOnly => "42Z54",
            SqlState::UnableToGenerate => "42Z50",
            SqlState::UnavailableActivationNeed => "42Z53",
            SqlState::InternalError => "XJ999",
            SqlState::SchemaDoesNotExist => "42Y07",
            SqlState::TableNotFound => "42X05",
            SqlState::ColumnNotFound => "42X04",
            SqlState::AmbiguousColumnName => "42X03",
            SqlState::DuplicateTableName => "42X09",
            SqlState::NotComparable => "42818",
            SqlState::NonBooleanWhereClause => "42X19",
            SqlState::BothOperandsParameters => "42X35",
            SqlState::NoDdlInSystemSchema => "42X62",
            SqlState::ObjectDoesNotExist => "42Y55",
            SqlState::DropViewOnNonView => "X0Y16",
            SqlState::InvalidOperationOnView => "42Y62",
            SqlState::NoSuchFunction => "42Y03",
            SqlState::AggregateBadType => "42Y22",
            SqlState::NoAggregatesInWhereClause => "42903",
            SqlState::AggregateContainsAggregate => "42Y33",
            SqlState::ColumnNotInNonGroupedSelect => "42Y35",
            SqlState::ColumnNotInGroupedSelect => "42Y36",
            SqlState::LogicalNonBoolean => "42Y94",
            SqlState::BinaryOperatorNotSupported => "42Y95",
            SqlState::NoSuchWindow => "42ZC0",
        }
    }
}

impl fmt::Display for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised while compiling a statement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A node was found in a state inconsistent with the current phase
    #[error("{state}: {message}")]
    Structural { state: SqlState, message: String },

    /// Name, type or aggregate resolution found no applicable definition
    #[error("{state}: {message}")]
    Resolution { state: SqlState, message: String },

    /// Parse-only statement reached the bind phase
    #[error("{}: {statement} has only parse-time effect", SqlState::ParseOnly)]
    ParseOnly { statement: String },

    /// A visitor callback failed mid-walk
    #[error("{state}: traversal aborted: {message}")]
    Traversal { state: SqlState, message: String },

    /// An external collaborator (dictionary, statistics, generator) failed
    #[error("{state}: {message}")]
    Collaborator { state: SqlState, message: String },
}

impl CompileError {
    pub fn structural(state: SqlState, message: impl Into<String>) -> Self {
        CompileError::Structural { state, message: message.into() }
    }

    pub fn resolution(state: SqlState, message: impl Into<String>) -> Self {
        CompileError::Resolution { state, message: message.into() }
    }

    pub fn traversal(message: impl Into<String>) -> Self {
        CompileError::Traversal { state: SqlState::InternalError, message: message.into() }
    }

    pub fn collaborator(state: SqlState, message: impl Into<String>) -> Self {
        CompileError::Collaborator { state, message: message.into() }
    }

    /// Phase-ordering violation, e.g. generating an unbound statement
    pub fn internal(message: impl Into<String>) -> Self {
        Self::structural(SqlState::InternalError, message)
    }

    /// The stable state code of this error
    pub fn state(&self) -> SqlState {
        match self {
            CompileError::Structural { state, .. }
            | CompileError::Resolution { state, .. }
            | CompileError::Traversal { state, .. }
            | CompileError::Collaborator { state, .. } => *state,
            CompileError::ParseOnly { .. } => SqlState::ParseOnly,
        }
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;
