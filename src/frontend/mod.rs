//! Frontend module - parse tree, scopes, semantic analysis

pub mod ast;
pub mod scope;
pub mod semantic;
pub mod tree;

pub use semantic::SemanticAnalyzer;
