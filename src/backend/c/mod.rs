//! C Backend - Generate C code from the Caju parse tree
//!
//! The output is a single self-contained translation unit that any C99
//! compiler accepts.

mod c_codegen;

pub use c_codegen::CCodeGen;
