//! Caju Compiler
//!
//! Semantic analysis and C code generation for Caju (SL) programs whose
//! parse tree has already been built by the front-end.

pub mod backend;
pub mod driver;
pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;
