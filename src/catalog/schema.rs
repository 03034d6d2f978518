// Type Descriptors
//
// This module defines the SQL data types the compiler reasons about during
// binding, and the nullable/precision-carrying descriptors built from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Data types known to the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeId {
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Double,
    Char,
    Varchar,
    Boolean,
    Date,
    Timestamp,
    Blob,
}

impl TypeId {
    /// SQL name of the type
    pub fn sql_name(&self) -> &'static str {
        match self {
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::Decimal => "DECIMAL",
            TypeId::Real => "REAL",
            TypeId::Double => "DOUBLE",
            TypeId::Char => "CHAR",
            TypeId::Varchar => "VARCHAR",
            TypeId::Boolean => "BOOLEAN",
            TypeId::Date => "DATE",
            TypeId::Timestamp => "TIMESTAMP",
            TypeId::Blob => "BLOB",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeId::SmallInt
                | TypeId::Integer
                | TypeId::BigInt
                | TypeId::Decimal
                | TypeId::Real
                | TypeId::Double
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeId::Char | TypeId::Varchar)
    }

    /// Whether values of this type can be compared with <, >, MAX, MIN
    pub fn is_orderable(&self) -> bool {
        !matches!(self, TypeId::Blob)
    }

    /// Rank used to pick the result type of mixed numeric arithmetic
    fn numeric_precedence(&self) -> u8 {
        match self {
            TypeId::SmallInt => 1,
            TypeId::Integer => 2,
            TypeId::BigInt => 3,
            TypeId::Decimal => 4,
            TypeId::Real => 5,
            TypeId::Double => 6,
            _ => 0,
        }
    }

    /// Whether a value of `self` can be compared with a value of `other`
    pub fn comparable_with(&self, other: &TypeId) -> bool {
        self == other
            || (self.is_numeric() && other.is_numeric())
            || (self.is_string() && other.is_string())
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A type together with nullability and size attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    type_id: TypeId,
    nullable: bool,
    /// Precision for DECIMAL, maximum length for character types
    precision: u32,
    scale: u32,
}

impl TypeDescriptor {
    /// Create a descriptor with the default size attributes of the type
    pub fn new(type_id: TypeId, nullable: bool) -> Self {
        let (precision, scale) = match type_id {
            TypeId::SmallInt => (5, 0),
            TypeId::Integer => (10, 0),
            TypeId::BigInt => (19, 0),
            TypeId::Decimal => (5, 0),
            TypeId::Real => (7, 0),
            TypeId::Double => (15, 0),
            TypeId::Char => (1, 0),
            TypeId::Varchar => (32672, 0),
            _ => (0, 0),
        };
        TypeDescriptor { type_id, nullable, precision, scale }
    }

    pub fn decimal(precision: u32, scale: u32, nullable: bool) -> Self {
        TypeDescriptor { type_id: TypeId::Decimal, nullable, precision, scale }
    }

    pub fn char(length: u32, nullable: bool) -> Self {
        TypeDescriptor { type_id: TypeId::Char, nullable, precision: length, scale: 0 }
    }

    pub fn varchar(max_length: u32, nullable: bool) -> Self {
        TypeDescriptor { type_id: TypeId::Varchar, nullable, precision: max_length, scale: 0 }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Copy of this descriptor with a different nullability
    pub fn with_nullable(&self, nullable: bool) -> Self {
        TypeDescriptor { nullable, ..self.clone() }
    }

    /// Result type of arithmetic between `self` and `other`, if both are numeric
    pub fn dominant_numeric(&self, other: &TypeDescriptor) -> Option<TypeDescriptor> {
        if !self.type_id.is_numeric() || !other.type_id.is_numeric() {
            return None;
        }
        let nullable = self.nullable || other.nullable;
        let winner = if self.type_id.numeric_precedence() >= other.type_id.numeric_precedence() {
            self
        } else {
            other
        };
        Some(winner.with_nullable(nullable))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_id {
            TypeId::Decimal => write!(f, "DECIMAL({}, {})", self.precision, self.scale)?,
            TypeId::Char | TypeId::Varchar => write!(f, "{}({})", self.type_id, self.precision)?,
            other => write!(f, "{}", other)?,
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}
