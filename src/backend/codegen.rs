//! Code Generation trait - Backend abstraction

use crate::frontend::ast::Program;

/// A backend that lowers a Caju program to target-language source text
pub trait CodeGen {
    /// Lower the whole program. Generation has no failure mode: whatever
    /// the tree contains is translated.
    fn generate(&mut self, program: &Program) -> String;

    /// Backend name (e.g., "C")
    fn name(&self) -> &str;

    /// Conventional file extension of the generated source, without the dot
    fn extension(&self) -> &str;
}
