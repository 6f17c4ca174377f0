//! Symbol table and scope management

use std::collections::HashMap;

use log::trace;

use crate::types::Type;

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type; for functions, the full signature
    pub ty: Type,
    pub initialized: bool,
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Param,
    Function { params: Vec<Type>, ret: Type },
}

impl Symbol {
    /// A declared, not yet assigned variable
    pub fn variable(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            ty,
            initialized: false,
        }
    }

    /// A variable that holds a value from the moment it is declared
    /// (for-each loop variables)
    pub fn bound_variable(name: &str, ty: Type) -> Self {
        Self {
            initialized: true,
            ..Self::variable(name, ty)
        }
    }

    pub fn param(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Param,
            ty,
            initialized: true,
        }
    }

    pub fn function(name: &str, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.to_string(),
            ty: Type::function(params.clone(), ret.clone()),
            kind: SymbolKind::Function { params, ret },
            initialized: true,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function { .. })
    }
}

/// One lexical scope: the symbols declared directly in it
pub type Scope = HashMap<String, Symbol>;

/// Stack of scopes, innermost last
///
/// Every symbol is owned by the scope it was declared in and dropped with it.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// An empty stack; the caller opens the global scope
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
        trace!("enter scope (depth {})", self.scopes.len());
    }

    /// Exit the current scope, dropping every symbol declared in it.
    ///
    /// Returns `None` when there is no scope to exit, which means enter/exit
    /// calls are unbalanced.
    pub fn exit_scope(&mut self) -> Option<Scope> {
        debug_assert!(!self.scopes.is_empty(), "exit_scope without a matching enter_scope");
        let scope = self.scopes.pop();
        trace!("exit scope (depth {})", self.scopes.len());
        scope
    }

    /// Insert a symbol into the current scope, replacing any symbol of the
    /// same name there. Duplicate detection is the caller's job.
    ///
    /// Returns the replaced symbol, if any.
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> Option<Symbol> {
        debug_assert!(!self.scopes.is_empty(), "declare outside of any scope");
        self.scopes
            .last_mut()
            .and_then(|scope| scope.insert(name.to_string(), symbol))
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Look up a symbol, searching from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_innermost_first() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        scopes.declare("x", Symbol::variable("x", Type::Number));
        scopes.enter_scope();
        scopes.declare("x", Symbol::variable("x", Type::Boolean));

        assert_eq!(scopes.lookup("x").map(|s| &s.ty), Some(&Type::Boolean));
        scopes.exit_scope();
        assert_eq!(scopes.lookup("x").map(|s| &s.ty), Some(&Type::Number));
    }

    #[test]
    fn test_exists_only_checks_current_scope() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        scopes.declare("x", Symbol::variable("x", Type::Number));
        scopes.enter_scope();

        assert!(!scopes.exists_in_current_scope("x"));
        assert!(scopes.lookup("x").is_some());
    }

    #[test]
    fn test_exit_drops_symbols() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        scopes.enter_scope();
        scopes.declare("y", Symbol::variable("y", Type::Character));

        let dropped = scopes.exit_scope().unwrap();
        assert!(dropped.contains_key("y"));
        assert!(scopes.lookup("y").is_none());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_declare_overwrites_silently() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        assert!(scopes.declare("x", Symbol::variable("x", Type::Number)).is_none());
        let replaced = scopes.declare("x", Symbol::variable("x", Type::Boolean));
        assert_eq!(replaced.map(|s| s.ty), Some(Type::Number));
        assert_eq!(scopes.lookup("x").map(|s| &s.ty), Some(&Type::Boolean));
    }

    #[test]
    fn test_lookup_mut_marks_initialized() {
        let mut scopes = ScopeStack::new();
        scopes.enter_scope();
        scopes.declare("x", Symbol::variable("x", Type::Number));
        if let Some(sym) = scopes.lookup_mut("x") {
            sym.initialized = true;
        }
        assert!(scopes.lookup("x").is_some_and(|s| s.initialized));
    }

    #[test]
    fn test_function_symbol() {
        let sym = Symbol::function("soma", vec![Type::Number, Type::Number], Type::Number);
        assert!(sym.is_function());
        assert!(sym.initialized);
        assert_eq!(
            sym.ty,
            Type::function(vec![Type::Number, Type::Number], Type::Number)
        );
    }
}
