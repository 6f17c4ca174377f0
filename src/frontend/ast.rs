//! Parse tree definitions for Caju
//!
//! The tree is produced by the external Caju front-end and handed to this
//! crate already parsed. Every node kind is a variant of a closed enum, so the
//! analyzer and the code generator dispatch on it exhaustively.

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Var(VarDecl),
    Function(FunctionDecl),
}

/// Variable declaration: one type, one or more names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: Type,
    pub names: Vec<String>,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub return_type: Type,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    /// Parameter types in declaration order
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// The function's full signature type
    pub fn signature(&self) -> Type {
        Type::function(self.param_types(), self.return_type.clone())
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    /// Local variable declaration
    Var(VarDecl),
    /// target = value
    Assign(Assign),
    /// Call used as a statement
    Call(Call),
    /// se (cond) { ... } senao { ... }
    If(IfStmt),
    /// enquanto (cond) { ... }
    While(WhileStmt),
    /// para (init; cond; step) { ... }
    For(ForStmt),
    /// para cada (tipo var : container) { ... }
    ForEach(ForEachStmt),
    /// retorne [value]
    Return(ReturnStmt),
}

/// Assignment to a named variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub target: String,
    pub value: Expr,
}

/// Function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Vec<Stmt>,
    #[serde(default)]
    pub else_branch: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    #[serde(default)]
    pub init: Vec<Assign>,
    #[serde(default)]
    pub cond: Option<Expr>,
    /// Increment assignments, run after every iteration
    #[serde(default)]
    pub step: Vec<Assign>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachStmt {
    pub var_type: Type,
    pub var: String,
    pub container: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    #[serde(default)]
    pub value: Option<Expr>,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `numero` literal; the range is that of the generated C `int`
    Number { value: i32 },
    Character { value: char },
    Boolean { value: bool },
    /// Variable reference
    Var { name: String },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Logical negation (nao)
    Not { expr: Box<Expr> },
    /// Arithmetic negation (unary -)
    Neg { expr: Box<Expr> },
    Call(Call),
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    // Additive
    Add,
    Sub,
    // Multiplicative
    Mul,
    Div,
    Mod,
    // Relational
    Lt,
    Le,
    Gt,
    Ge,
    // Equality
    Eq,
    Ne,
    // Logical
    And,
    Or,
}

/// Grammar class of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Additive,
    Multiplicative,
    Relational,
    Equality,
    And,
    Or,
}

impl BinOp {
    pub fn class(self) -> OpClass {
        match self {
            BinOp::Add | BinOp::Sub => OpClass::Additive,
            BinOp::Mul | BinOp::Div | BinOp::Mod => OpClass::Multiplicative,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => OpClass::Relational,
            BinOp::Eq | BinOp::Ne => OpClass::Equality,
            BinOp::And => OpClass::And,
            BinOp::Or => OpClass::Or,
        }
    }
}

// Shorthand constructors, mostly for building trees in tests.

impl Expr {
    pub fn number(value: i32) -> Self {
        Expr::Number { value }
    }

    pub fn character(value: char) -> Self {
        Expr::Character { value }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Boolean { value }
    }

    pub fn var(name: &str) -> Self {
        Expr::Var {
            name: name.to_string(),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not {
            expr: Box::new(expr),
        }
    }

    pub fn neg(expr: Expr) -> Self {
        Expr::Neg {
            expr: Box::new(expr),
        }
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(Call::new(name, args))
    }
}

impl Call {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }
}

impl Assign {
    pub fn new(target: &str, value: Expr) -> Self {
        Self {
            target: target.to_string(),
            value,
        }
    }
}

impl VarDecl {
    pub fn new(ty: Type, names: &[&str]) -> Self {
        Self {
            ty,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl Param {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

impl Stmt {
    pub fn var(ty: Type, names: &[&str]) -> Self {
        Stmt::Var(VarDecl::new(ty, names))
    }

    pub fn assign(target: &str, value: Expr) -> Self {
        Stmt::Assign(Assign::new(target, value))
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Stmt::Call(Call::new(name, args))
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return(ReturnStmt { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deserialize_function() {
        let tree: Program = serde_json::from_value(json!({
            "items": [{
                "kind": "function",
                "name": "soma",
                "params": [
                    { "name": "a", "ty": "number" },
                    { "name": "b", "ty": "number" }
                ],
                "return_type": "number",
                "body": [{
                    "kind": "return",
                    "value": {
                        "kind": "binary",
                        "op": "add",
                        "left": { "kind": "var", "name": "a" },
                        "right": { "kind": "var", "name": "b" }
                    }
                }]
            }]
        }))
        .unwrap();

        let expected = Program {
            items: vec![Item::Function(FunctionDecl {
                name: "soma".to_string(),
                params: vec![Param::new("a", Type::Number), Param::new("b", Type::Number)],
                return_type: Type::Number,
                body: vec![Stmt::ret(Some(Expr::binary(
                    BinOp::Add,
                    Expr::var("a"),
                    Expr::var("b"),
                )))],
            })],
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_optional_fields_default() {
        let stmt: Stmt = serde_json::from_value(json!({
            "kind": "for",
            "body": []
        }))
        .unwrap();
        let Stmt::For(f) = stmt else {
            panic!("expected a for statement");
        };
        assert!(f.init.is_empty());
        assert!(f.cond.is_none());
        assert!(f.step.is_empty());
    }

    #[test]
    fn test_operator_classes() {
        assert_eq!(BinOp::Sub.class(), OpClass::Additive);
        assert_eq!(BinOp::Mod.class(), OpClass::Multiplicative);
        assert_eq!(BinOp::Ge.class(), OpClass::Relational);
        assert_eq!(BinOp::Ne.class(), OpClass::Equality);
        assert_eq!(BinOp::Or.class(), OpClass::Or);
    }

    #[test]
    fn test_signature() {
        let func = FunctionDecl {
            name: "f".to_string(),
            params: vec![Param::new("v", Type::array(Type::Number))],
            return_type: Type::Boolean,
            body: vec![],
        };
        assert_eq!(
            func.signature(),
            Type::function(vec![Type::array(Type::Number)], Type::Boolean)
        );
    }
}
