//! Type definitions shared by the analyzer and the code generator

pub mod type_system;

pub use type_system::Type;
