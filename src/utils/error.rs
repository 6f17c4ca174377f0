//! Error handling for the Caju compiler
//!
//! Two tiers: [`Error`] covers failures before the core runs (reading the
//! file, loading the tree) and is fatal. [`SemanticError`] is one analyzer
//! diagnostic; those are collected, never raised.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Type;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal, pre-core failure
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported source suffix for '{path}' (expected .caju or .cj)")]
    UnsupportedSuffix { path: PathBuf },

    #[error("malformed input at line {line}, column {column}: {message}")]
    Lexical {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("invalid parse tree at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{0}")]
    Unexpected(String),
}

/// Reporting category of a pre-core failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    FileAccess,
    Lexical,
    Syntactic,
    Unclassified,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } | Self::UnsupportedSuffix { .. } => ErrorCategory::FileAccess,
            Self::Lexical { .. } => ErrorCategory::Lexical,
            Self::Syntax { .. } => ErrorCategory::Syntactic,
            Self::Unexpected(_) => ErrorCategory::Unclassified,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileAccess => write!(f, "file access error"),
            Self::Lexical => write!(f, "error during lexical analysis"),
            Self::Syntactic => write!(f, "error during syntactic analysis"),
            Self::Unclassified => write!(f, "unexpected error"),
        }
    }
}

/// Statement whose condition is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    If,
    While,
    For,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::If => write!(f, "se"),
            Self::While => write!(f, "enquanto"),
            Self::For => write!(f, "para"),
        }
    }
}

/// One semantic diagnostic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    // ==================== Declarations ====================

    #[error("variable '{name}' is already declared in this scope")]
    DuplicateVariable { name: String },

    #[error("function '{name}' is already declared")]
    DuplicateFunction { name: String },

    // ==================== Names ====================

    #[error("variable '{name}' is not declared")]
    UndeclaredVariable { name: String },

    #[error("variable '{name}' is used before being initialized")]
    UninitializedVariable { name: String },

    #[error("function '{name}' is not declared")]
    UndeclaredFunction { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    // ==================== Types ====================

    #[error("type mismatch in assignment to '{target}': expected {expected}, found {found}")]
    AssignmentTypeMismatch {
        target: String,
        expected: Type,
        found: Type,
    },

    #[error("wrong number of arguments to '{function}': expected {expected}, found {found}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("type mismatch in argument {position} of '{function}': expected {expected}, found {found}")]
    ArgumentTypeMismatch {
        function: String,
        position: usize,
        expected: Type,
        found: Type,
    },

    #[error("condition of '{construct}' must be booleano, found {found}")]
    ConditionNotBoolean { construct: Construct, found: Type },

    #[error("'{name}' is not a vetor")]
    NotAnArray { name: String },

    #[error("type mismatch in 'para cada': elements are {element}, but '{var}' is {found}")]
    ForEachTypeMismatch {
        var: String,
        element: Type,
        found: Type,
    },

    #[error("operator 'nao' expects booleano, found {found}")]
    NotOperandMismatch { found: Type },

    #[error("unary operator '-' expects numero, found {found}")]
    NegOperandMismatch { found: Type },

    #[error("character literal U+{:04X} does not fit in a caractere", code_point(.value))]
    UnsupportedCharacter { value: char },

    // ==================== Returns ====================

    #[error("'retorne' outside of a function")]
    ReturnOutsideFunction,

    #[error("return type mismatch in '{function}': expected {expected}, found {found}")]
    ReturnTypeMismatch {
        function: String,
        expected: Type,
        found: Type,
    },

    #[error("'retorne' in '{function}' needs a value of type {expected}")]
    MissingReturnValue { function: String, expected: Type },

    #[error("function '{function}' must return a value of type {expected}")]
    MissingReturn { function: String, expected: Type },
}

fn code_point(c: &char) -> u32 {
    u32::from(*c)
}

impl SemanticError {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateVariable { .. } => "E0001",
            Self::DuplicateFunction { .. } => "E0002",
            Self::UndeclaredVariable { .. } => "E0003",
            Self::UninitializedVariable { .. } => "E0004",
            Self::UndeclaredFunction { .. } => "E0005",
            Self::NotAFunction { .. } => "E0006",
            Self::AssignmentTypeMismatch { .. } => "E0007",
            Self::ArgumentCountMismatch { .. } => "E0008",
            Self::ArgumentTypeMismatch { .. } => "E0009",
            Self::ConditionNotBoolean { .. } => "E0010",
            Self::NotAnArray { .. } => "E0011",
            Self::ForEachTypeMismatch { .. } => "E0012",
            Self::NotOperandMismatch { .. } => "E0013",
            Self::NegOperandMismatch { .. } => "E0014",
            Self::ReturnOutsideFunction => "E0015",
            Self::ReturnTypeMismatch { .. } => "E0016",
            Self::MissingReturnValue { .. } => "E0017",
            Self::MissingReturn { .. } => "E0018",
            Self::UnsupportedCharacter { .. } => "E0019",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mismatch_names_both_types() {
        let err = SemanticError::AssignmentTypeMismatch {
            target: "x".to_string(),
            expected: Type::Number,
            found: Type::Character,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch in assignment to 'x': expected numero, found caractere"
        );
    }

    #[test]
    fn test_condition_names_construct() {
        let err = SemanticError::ConditionNotBoolean {
            construct: Construct::While,
            found: Type::Number,
        };
        assert_eq!(
            err.to_string(),
            "condition of 'enquanto' must be booleano, found numero"
        );
    }

    #[test]
    fn test_unsupported_character_names_code_point() {
        let err = SemanticError::UnsupportedCharacter { value: '€' };
        assert_eq!(err.to_string(), "character literal U+20AC does not fit in a caractere");
        assert_eq!(err.code(), "E0019");
    }

    #[test]
    fn test_categories() {
        let io = Error::Io {
            path: PathBuf::from("a.caju"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.category(), ErrorCategory::FileAccess);
        assert_eq!(
            Error::Syntax {
                message: "x".into(),
                line: 1,
                column: 1
            }
            .category(),
            ErrorCategory::Syntactic
        );
        assert_eq!(
            Error::Unexpected("boom".into()).category(),
            ErrorCategory::Unclassified
        );
    }
}
