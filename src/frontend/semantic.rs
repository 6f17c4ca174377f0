//! Semantic Analysis for Caju
//!
//! Performs:
//! - Scope management (declarations, name resolution)
//! - Type checking of assignments, conditions, calls and returns
//! - Missing-return and use-before-initialization detection
//!
//! The analyzer never stops at a violation. Each one becomes a
//! [`SemanticError`] in an ordered list and the walk carries on, so a single
//! run reports everything it can find.

use log::{debug, info};

use crate::frontend::ast::*;
use crate::frontend::scope::{ScopeStack, Symbol, SymbolKind};
use crate::types::Type;
use crate::utils::{Construct, SemanticError};

/// Function exempt from the missing-return check
pub const ENTRY_POINT: &str = "main";

/// Largest character a `caractere` (a C `char`) can hold
pub const MAX_CHARACTER: char = '\u{ff}';

/// Per-function state, alive exactly as long as the function's scope
#[derive(Debug)]
struct FunctionContext {
    name: String,
    return_type: Type,
    /// Set by any `retorne` anywhere in the body. This is not a per-path
    /// proof: a return in one branch satisfies the whole function.
    has_return: bool,
}

impl FunctionContext {
    fn new(func: &FunctionDecl) -> Self {
        Self {
            name: func.name.clone(),
            return_type: func.return_type.clone(),
            has_return: false,
        }
    }
}

/// Semantic analyzer
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    scopes: ScopeStack,
    errors: Vec<SemanticError>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            errors: Vec::new(),
        }
    }

    /// Analyze a program, returning every diagnostic in the order found
    pub fn analyze(&mut self, program: &Program) -> &[SemanticError] {
        info!("semantic analysis started ({} items)", program.items.len());
        self.errors.clear();
        self.scopes = ScopeStack::new();

        // Global scope
        self.scopes.enter_scope();
        for item in &program.items {
            match item {
                Item::Var(decl) => self.check_var_decl(decl),
                Item::Function(func) => self.check_function(func),
            }
        }
        self.scopes.exit_scope();

        if self.errors.is_empty() {
            info!("semantic analysis finished without errors");
        } else {
            info!("semantic analysis found {} error(s)", self.errors.len());
        }
        &self.errors
    }

    /// Diagnostics of the last run
    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    /// Diagnostic messages of the last run, in order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }

    fn error(&mut self, error: SemanticError) {
        debug!("{}", error);
        self.errors.push(error);
    }

    // ==================== Declarations ====================

    fn check_var_decl(&mut self, decl: &VarDecl) {
        for name in &decl.names {
            if self.scopes.exists_in_current_scope(name) {
                self.error(SemanticError::DuplicateVariable { name: name.clone() });
            } else {
                self.scopes.declare(name, Symbol::variable(name, decl.ty.clone()));
            }
        }
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        // Registered in the enclosing scope before the body is walked, so the
        // body can call the function itself but not anything declared later.
        if self.scopes.exists_in_current_scope(&func.name) {
            self.error(SemanticError::DuplicateFunction {
                name: func.name.clone(),
            });
        } else {
            self.scopes.declare(
                &func.name,
                Symbol::function(&func.name, func.param_types(), func.return_type.clone()),
            );
        }

        debug!("checking function '{}'", func.name);
        self.scopes.enter_scope();
        for param in &func.params {
            self.scopes.declare(&param.name, Symbol::param(&param.name, param.ty.clone()));
        }

        let mut ctx = FunctionContext::new(func);
        self.check_stmts(&func.body, Some(&mut ctx));

        if !ctx.return_type.is_void() && !ctx.has_return && ctx.name != ENTRY_POINT {
            self.error(SemanticError::MissingReturn {
                function: ctx.name,
                expected: ctx.return_type,
            });
        }
        self.scopes.exit_scope();
    }

    // ==================== Statements ====================

    fn check_stmts(&mut self, stmts: &[Stmt], mut func: Option<&mut FunctionContext>) {
        for stmt in stmts {
            self.check_stmt(stmt, func.as_deref_mut());
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, mut func: Option<&mut FunctionContext>) {
        match stmt {
            Stmt::Var(decl) => self.check_var_decl(decl),
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Call(call) => {
                self.check_call(call);
            }
            Stmt::If(s) => {
                self.check_condition(&s.cond, Construct::If);
                self.scopes.enter_scope();
                self.check_stmts(&s.then_branch, func.as_deref_mut());
                self.scopes.exit_scope();
                if let Some(else_branch) = &s.else_branch {
                    self.scopes.enter_scope();
                    self.check_stmts(else_branch, func);
                    self.scopes.exit_scope();
                }
            }
            Stmt::While(s) => {
                self.check_condition(&s.cond, Construct::While);
                self.scopes.enter_scope();
                self.check_stmts(&s.body, func);
                self.scopes.exit_scope();
            }
            Stmt::For(s) => self.check_for(s, func),
            Stmt::ForEach(s) => self.check_for_each(s, func),
            Stmt::Return(s) => self.check_return(s, func),
        }
    }

    fn check_assign(&mut self, assign: &Assign) {
        let Some(expected) = self.scopes.lookup(&assign.target).map(|s| s.ty.clone()) else {
            self.error(SemanticError::UndeclaredVariable {
                name: assign.target.clone(),
            });
            return;
        };

        let found = self.expr_type(&assign.value);
        if !expected.accepts(&found) {
            self.error(SemanticError::AssignmentTypeMismatch {
                target: assign.target.clone(),
                expected,
                found,
            });
        }

        // Initialization is tracked independently of type correctness
        if let Some(symbol) = self.scopes.lookup_mut(&assign.target) {
            symbol.initialized = true;
        }
    }

    fn check_condition(&mut self, cond: &Expr, construct: Construct) {
        let found = self.expr_type(cond);
        if !Type::Boolean.accepts(&found) {
            self.error(SemanticError::ConditionNotBoolean { construct, found });
        }
    }

    fn check_for(&mut self, s: &ForStmt, func: Option<&mut FunctionContext>) {
        self.scopes.enter_scope();
        for assign in &s.init {
            self.check_assign(assign);
        }
        // The step list is checked both before and after the condition, so
        // a faulty step assignment is reported twice.
        for assign in &s.step {
            self.check_assign(assign);
        }
        if let Some(cond) = &s.cond {
            self.check_condition(cond, Construct::For);
        }
        for assign in &s.step {
            self.check_assign(assign);
        }
        self.check_stmts(&s.body, func);
        self.scopes.exit_scope();
    }

    fn check_for_each(&mut self, s: &ForEachStmt, func: Option<&mut FunctionContext>) {
        self.scopes.enter_scope();
        self.scopes.declare(&s.var, Symbol::bound_variable(&s.var, s.var_type.clone()));

        match self.scopes.lookup(&s.container).map(|sym| sym.ty.clone()) {
            None => self.error(SemanticError::UndeclaredVariable {
                name: s.container.clone(),
            }),
            Some(container_ty) => match container_ty.element() {
                None => self.error(SemanticError::NotAnArray {
                    name: s.container.clone(),
                }),
                Some(element) if !s.var_type.accepts(element) => {
                    self.error(SemanticError::ForEachTypeMismatch {
                        var: s.var.clone(),
                        element: element.clone(),
                        found: s.var_type.clone(),
                    })
                }
                Some(_) => {}
            },
        }

        self.check_stmts(&s.body, func);
        self.scopes.exit_scope();
    }

    fn check_return(&mut self, s: &ReturnStmt, func: Option<&mut FunctionContext>) {
        let Some(ctx) = func else {
            self.error(SemanticError::ReturnOutsideFunction);
            return;
        };

        match &s.value {
            Some(value) => {
                let found = self.expr_type(value);
                if !ctx.return_type.accepts(&found) {
                    self.error(SemanticError::ReturnTypeMismatch {
                        function: ctx.name.clone(),
                        expected: ctx.return_type.clone(),
                        found,
                    });
                }
            }
            None if !ctx.return_type.is_void() => {
                self.error(SemanticError::MissingReturnValue {
                    function: ctx.name.clone(),
                    expected: ctx.return_type.clone(),
                });
            }
            None => {}
        }

        ctx.has_return = true;
    }

    /// Check a call and return the callee's return type, or `Unknown` when
    /// the callee does not resolve to a function
    fn check_call(&mut self, call: &Call) -> Type {
        let (params, ret) = match self.scopes.lookup(&call.name) {
            Some(Symbol {
                kind: SymbolKind::Function { params, ret },
                ..
            }) => (params.clone(), ret.clone()),
            Some(_) => {
                self.error(SemanticError::NotAFunction {
                    name: call.name.clone(),
                });
                return Type::Unknown;
            }
            None => {
                self.error(SemanticError::UndeclaredFunction {
                    name: call.name.clone(),
                });
                return Type::Unknown;
            }
        };

        if call.args.len() != params.len() {
            self.error(SemanticError::ArgumentCountMismatch {
                function: call.name.clone(),
                expected: params.len(),
                found: call.args.len(),
            });
            return ret;
        }

        for (i, (arg, expected)) in call.args.iter().zip(&params).enumerate() {
            let found = self.expr_type(arg);
            if !expected.accepts(&found) {
                self.error(SemanticError::ArgumentTypeMismatch {
                    function: call.name.clone(),
                    position: i + 1,
                    expected: expected.clone(),
                    found,
                });
            }
        }
        ret
    }

    // ==================== Expressions ====================

    /// Compute the type of an expression, recording any errors on the way
    fn expr_type(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Number { .. } => Type::Number,
            Expr::Character { value } => {
                if *value > MAX_CHARACTER {
                    self.error(SemanticError::UnsupportedCharacter { value: *value });
                }
                Type::Character
            }
            Expr::Boolean { .. } => Type::Boolean,
            Expr::Var { name } => self.var_type(name),
            Expr::Binary { op, left, right } => {
                // Operands are resolved but their types are not validated
                self.expr_type(left);
                self.expr_type(right);
                match op.class() {
                    OpClass::Additive | OpClass::Multiplicative => Type::Number,
                    OpClass::Relational | OpClass::Equality | OpClass::And | OpClass::Or => {
                        Type::Boolean
                    }
                }
            }
            Expr::Not { expr } => {
                let found = self.expr_type(expr);
                if !Type::Boolean.accepts(&found) {
                    self.error(SemanticError::NotOperandMismatch { found });
                }
                Type::Boolean
            }
            Expr::Neg { expr } => {
                let found = self.expr_type(expr);
                if !Type::Number.accepts(&found) {
                    self.error(SemanticError::NegOperandMismatch { found });
                }
                Type::Number
            }
            Expr::Call(call) => self.check_call(call),
        }
    }

    fn var_type(&mut self, name: &str) -> Type {
        let Some((ty, initialized)) = self
            .scopes
            .lookup(name)
            .map(|s| (s.ty.clone(), s.initialized))
        else {
            self.error(SemanticError::UndeclaredVariable {
                name: name.to_string(),
            });
            return Type::Unknown;
        };

        if !initialized {
            self.error(SemanticError::UninitializedVariable {
                name: name.to_string(),
            });
        }
        ty
    }
}
