//! Utility module

mod error;

pub use error::{Construct, Error, ErrorCategory, Result, SemanticError};
