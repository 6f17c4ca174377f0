//! Parse tree loading
//!
//! Tokenizing and parsing Caju happens in the external front-end, which hands
//! over the finished tree as JSON. This module turns that document back into
//! a [`Program`] and sorts failures into the reporting categories.

use std::fs;
use std::path::Path;

use log::debug;
use serde_json::error::Category;

use crate::frontend::ast::Program;
use crate::utils::{Error, Result};

/// Parse a serialized tree
pub fn from_json(text: &str) -> Result<Program> {
    serde_json::from_str(text).map_err(classify)
}

/// Read and parse a serialized tree file
pub fn load(path: &Path) -> Result<Program> {
    debug!("loading parse tree from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&text)
}

fn classify(err: serde_json::Error) -> Error {
    let (line, column) = (err.line(), err.column());
    match err.classify() {
        // Text that is not a well-formed document at all
        Category::Syntax | Category::Eof => Error::Lexical {
            message: err.to_string(),
            line,
            column,
        },
        // Well-formed, but not shaped like a Caju tree
        Category::Data => Error::Syntax {
            message: err.to_string(),
            line,
            column,
        },
        Category::Io => Error::Unexpected(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Item;
    use crate::utils::ErrorCategory;

    #[test]
    fn test_load_valid_tree() {
        let program = from_json(
            r#"{ "items": [ { "kind": "var", "ty": "number", "names": ["x", "y"] } ] }"#,
        )
        .unwrap();
        assert!(matches!(&program.items[0], Item::Var(decl) if decl.names.len() == 2));
    }

    #[test]
    fn test_malformed_text_is_lexical() {
        let err = from_json(r#"{ "items": [ "#).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Lexical);

        let err = from_json("{ items: @ }").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Lexical);
    }

    #[test]
    fn test_wrong_shape_is_syntactic() {
        let err = from_json(r#"{ "items": [ { "kind": "loop" } ] }"#).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntactic);
    }

    #[test]
    fn test_number_outside_int_range_is_syntactic() {
        let tree = |value: &str| {
            format!(
                r#"{{ "items": [ {{ "kind": "function", "name": "main", "return_type": "void",
                     "body": [ {{ "kind": "assign", "target": "x",
                                 "value": {{ "kind": "number", "value": {} }} }} ] }} ] }}"#,
                value
            )
        };
        assert!(from_json(&tree("2147483647")).is_ok());
        assert!(from_json(&tree("-2147483648")).is_ok());

        let err = from_json(&tree("3000000000")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntactic);
        let err = from_json(&tree("-2147483649")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntactic);
    }

    #[test]
    fn test_missing_file_is_file_access() {
        let err = load(Path::new("/nonexistent/dir/prog.caju.json")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::FileAccess);
    }
}
