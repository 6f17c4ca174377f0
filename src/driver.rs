//! Compilation pipeline: load the tree, analyze it, lower it to C.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::backend::{CCodeGen, CodeGen};
use crate::frontend::ast::Program;
use crate::frontend::{tree, SemanticAnalyzer};
use crate::utils::{Error, Result, SemanticError};

/// Recognized source suffixes; the `.json` forms hold the serialized tree
const SOURCE_SUFFIXES: &[&str] = &[".caju.json", ".cj.json", ".caju", ".cj"];

/// Result of running the core over one program
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Semantic diagnostics, in the order they were found
    pub diagnostics: Vec<SemanticError>,
    /// Generated C source
    pub generated: String,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics as report lines
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|e| e.to_string()).collect()
    }
}

/// Analyze `program` and lower it to C.
///
/// Generation runs whatever the analyzer found.
pub fn compile(program: &Program) -> Compilation {
    let diagnostics = check(program);
    if !diagnostics.is_empty() {
        warn!("generating code despite {} semantic diagnostic(s)", diagnostics.len());
    }

    let mut codegen = CCodeGen::new();
    let generated = codegen.generate(program);
    info!("{} backend produced {} bytes", codegen.name(), generated.len());

    Compilation {
        diagnostics,
        generated,
    }
}

/// Analyze `program` without generating code
pub fn check(program: &Program) -> Vec<SemanticError> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze(program);
    analyzer.into_errors()
}

/// Load the serialized tree at `input`, after validating its suffix
pub fn load_program(input: &Path) -> Result<Program> {
    source_stem(input)?;
    tree::load(input)
}

/// Output path for `input` when none is given: the source suffix replaced by
/// the C backend's extension
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    output_path(input, CCodeGen::new().extension())
}

/// The source suffix replaced by `.extension`
pub fn output_path(input: &Path, extension: &str) -> Result<PathBuf> {
    let stem = source_stem(input)?;
    Ok(input.with_file_name(format!("{}.{}", stem, extension)))
}

fn source_stem(input: &Path) -> Result<String> {
    let unsupported = || Error::UnsupportedSuffix {
        path: input.to_path_buf(),
    };
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(unsupported)?;
    SOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Expr, FunctionDecl, Item, Stmt};
    use crate::types::Type;
    use crate::utils::ErrorCategory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("prog.caju"), "c").unwrap(),
            PathBuf::from("prog.c")
        );
        assert_eq!(
            output_path(Path::new("dir/prog.cj"), "c").unwrap(),
            PathBuf::from("dir/prog.c")
        );
        assert_eq!(
            output_path(Path::new("prog.caju.json"), "c").unwrap(),
            PathBuf::from("prog.c")
        );
        assert_eq!(
            output_path(Path::new("a.b.cj.json"), "c").unwrap(),
            PathBuf::from("a.b.c")
        );
    }

    #[test]
    fn test_default_output_uses_backend_extension() {
        assert_eq!(
            default_output_path(Path::new("dir/prog.caju.json")).unwrap(),
            PathBuf::from("dir/prog.c")
        );
        assert!(default_output_path(Path::new("prog.txt")).is_err());
    }

    #[test]
    fn test_unsupported_suffix() {
        for name in ["prog.txt", "prog.json", "prog", ".caju"] {
            let err = output_path(Path::new(name), "c").unwrap_err();
            assert_eq!(err.category(), ErrorCategory::FileAccess, "{}", name);
        }
    }

    #[test]
    fn test_load_rejects_suffix_before_reading() {
        let err = load_program(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSuffix { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_program(Path::new("does/not/exist.caju.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.category(), ErrorCategory::FileAccess);
    }

    #[test]
    fn test_compile_is_not_gated() {
        let program = Program {
            items: vec![Item::Function(FunctionDecl {
                name: "f".to_string(),
                params: vec![],
                return_type: Type::Number,
                body: vec![Stmt::assign("x", Expr::number(1))],
            })],
        };
        let result = compile(&program);
        assert_eq!(
            result.messages(),
            vec![
                "variable 'x' is not declared".to_string(),
                "function 'f' must return a value of type numero".to_string(),
            ]
        );
        assert!(!result.is_clean());
        assert!(result.generated.contains("int f(void) {\n    x = 1;\n}\n"));
    }

    #[test]
    fn test_check_clean_program() {
        let program = Program {
            items: vec![Item::Function(FunctionDecl {
                name: "main".to_string(),
                params: vec![],
                return_type: Type::Void,
                body: vec![],
            })],
        };
        assert!(check(&program).is_empty());
    }
}
