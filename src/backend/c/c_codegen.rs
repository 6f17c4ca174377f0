//! C Code Generator
//!
//! Lowers the Caju parse tree to C source text, one construct at a time:
//! declarations keep their names, control flow keeps its nesting, and
//! expressions keep their tree shape through explicit parentheses.

use std::collections::HashSet;

use log::{debug, info};

use crate::backend::codegen::CodeGen;
use crate::frontend::ast::*;
use crate::frontend::semantic::{ENTRY_POINT, MAX_CHARACTER};
use crate::types::Type;

/// Words an SL identifier may not keep verbatim in C
const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
    // <stdbool.h>
    "bool", "true", "false",
];

/// Prefix of every name the generator invents
const GENERATED_PREFIX: &str = "caju_";

/// C code generator
#[derive(Debug, Default)]
pub struct CCodeGen {
    output: String,
    indent: usize,
    /// For-each loops emitted so far in the current function
    loop_counter: usize,
    /// The current function is a `vazio main` lowered to `int main`
    in_entry_point: bool,
}

impl CCodeGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write indented line
    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Generate the complete C source file
    pub fn generate_source(&mut self, program: &Program) -> String {
        self.output.clear();
        self.indent = 0;

        self.writeln("/* Generated by cajuc */");
        self.writeln("#include <stdbool.h>");
        self.writeln("");

        for ty in collect_array_types(program) {
            self.generate_array_typedef(&ty);
        }

        // Prototypes, so definition order never matters to the C compiler
        let mut has_functions = false;
        for item in &program.items {
            if let Item::Function(func) = item {
                let proto = format!("{};", signature(func));
                self.writeln(&proto);
                has_functions = true;
            }
        }
        if has_functions {
            self.writeln("");
        }

        let mut after_globals = false;
        for item in &program.items {
            match item {
                Item::Var(decl) => {
                    self.generate_var_decl(decl);
                    after_globals = true;
                }
                Item::Function(func) => {
                    if after_globals {
                        self.writeln("");
                        after_globals = false;
                    }
                    self.generate_function(func);
                }
            }
        }

        info!("generated {} bytes of C", self.output.len());
        std::mem::take(&mut self.output)
    }

    fn generate_array_typedef(&mut self, ty: &Type) {
        let Some(elem) = ty.element() else {
            return;
        };
        let data = declarator(elem, "*data");
        self.writeln("typedef struct {");
        self.writeln(&format!("    {};", data));
        self.writeln("    int length;");
        self.writeln(&format!("}} {};", c_type(ty)));
        self.writeln("");
    }

    fn generate_var_decl(&mut self, decl: &VarDecl) {
        if matches!(decl.ty, Type::Function { .. }) {
            // Function pointer declarators do not share a base type
            for name in &decl.names {
                let line = format!("{};", declarator(&decl.ty, &c_ident(name)));
                self.writeln(&line);
            }
            return;
        }

        let zeroed = matches!(decl.ty, Type::Array(_));
        let names: Vec<String> = decl
            .names
            .iter()
            .map(|name| {
                if zeroed {
                    format!("{} = {{0}}", c_ident(name))
                } else {
                    c_ident(name)
                }
            })
            .collect();
        let line = format!("{} {};", c_type(&decl.ty), names.join(", "));
        self.writeln(&line);
    }

    fn generate_function(&mut self, func: &FunctionDecl) {
        debug!("generating function '{}'", func.name);
        self.loop_counter = 0;
        self.in_entry_point = lowers_to_int_main(func);

        let header = format!("{} {{", signature(func));
        self.writeln(&header);
        self.indent += 1;
        self.generate_block(&func.body);
        if self.in_entry_point {
            self.writeln("return 0;");
        }
        self.indent -= 1;
        self.writeln("}");
        self.writeln("");

        self.in_entry_point = false;
    }

    fn generate_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.generate_stmt(stmt);
        }
    }

    /// Emit `head {`, the indented body, and the closing brace
    fn generate_braced(&mut self, head: &str, body: &[Stmt]) {
        self.writeln(&format!("{} {{", head));
        self.indent += 1;
        self.generate_block(body);
        self.indent -= 1;
    }

    fn generate_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => self.generate_var_decl(decl),
            Stmt::Assign(assign) => {
                let line = format!("{};", assign_to_c(assign));
                self.writeln(&line);
            }
            Stmt::Call(call) => {
                let line = format!("{};", call_to_c(call));
                self.writeln(&line);
            }
            Stmt::If(s) => {
                self.generate_braced(&format!("if ({})", expr_to_c(&s.cond)), &s.then_branch);
                match &s.else_branch {
                    Some(else_branch) => {
                        self.generate_braced("} else", else_branch);
                        self.writeln("}");
                    }
                    None => self.writeln("}"),
                }
            }
            Stmt::While(s) => {
                self.generate_braced(&format!("while ({})", expr_to_c(&s.cond)), &s.body);
                self.writeln("}");
            }
            Stmt::For(s) => {
                let init: Vec<String> = s.init.iter().map(assign_to_c).collect();
                let step: Vec<String> = s.step.iter().map(assign_to_c).collect();
                let cond = s.cond.as_ref().map(expr_to_c);
                let head = format!(
                    "for ({};{};{})",
                    init.join(", "),
                    leading_space(cond.as_deref().unwrap_or("")),
                    leading_space(&step.join(", ")),
                );
                self.generate_braced(&head, &s.body);
                self.writeln("}");
            }
            Stmt::ForEach(s) => self.generate_for_each(s),
            Stmt::Return(s) => {
                let line = match &s.value {
                    Some(value) => format!("return {};", expr_to_c(value)),
                    None if self.in_entry_point => "return 0;".to_string(),
                    None => "return;".to_string(),
                };
                self.writeln(&line);
            }
        }
    }

    /// `para cada` becomes an index loop that binds the element on each pass
    fn generate_for_each(&mut self, s: &ForEachStmt) {
        let index = format!("{}i{}", GENERATED_PREFIX, self.loop_counter);
        self.loop_counter += 1;
        let container = c_ident(&s.container);

        let head = format!(
            "for (int {idx} = 0; {idx} < {c}.length; {idx}++)",
            idx = index,
            c = container
        );
        self.writeln(&format!("{} {{", head));
        self.indent += 1;
        let bind = format!(
            "{} = {}.data[{}];",
            declarator(&s.var_type, &c_ident(&s.var)),
            container,
            index
        );
        self.writeln(&bind);
        self.generate_block(&s.body);
        self.indent -= 1;
        self.writeln("}");
    }
}

impl CodeGen for CCodeGen {
    fn generate(&mut self, program: &Program) -> String {
        self.generate_source(program)
    }

    fn name(&self) -> &str {
        "C"
    }

    fn extension(&self) -> &str {
        "c"
    }
}

// ==================== Names and types ====================

/// Map an SL identifier to a C identifier that cannot clash with C itself
/// or with generated names.
///
/// Escaping appends `_`. Names already ending in `_` are escaped too, so
/// `int` and `int_` stay distinct (`int_` and `int__`).
fn c_ident(name: &str) -> String {
    if C_RESERVED.contains(&name) || name.starts_with(GENERATED_PREFIX) || name.ends_with('_') {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Convert a Caju type to a C type
fn c_type(ty: &Type) -> String {
    match ty {
        Type::Number | Type::Unknown => "int".to_string(),
        Type::Character => "char".to_string(),
        Type::Boolean => "bool".to_string(),
        Type::Void => "void".to_string(),
        Type::Array(_) => format!("{}{}", GENERATED_PREFIX, mangle(ty)),
        Type::Function { params, ret } => {
            format!("{} (*)({})", c_type(ret), param_list(params))
        }
    }
}

/// Declare `name` with type `ty`
fn declarator(ty: &Type, name: &str) -> String {
    match ty {
        Type::Function { params, ret } => {
            format!("{} (*{})({})", c_type(ret), name, param_list(params))
        }
        _ => format!("{} {}", c_type(ty), name),
    }
}

fn param_list(params: &[Type]) -> String {
    if params.is_empty() {
        "void".to_string()
    } else {
        params.iter().map(c_type).collect::<Vec<_>>().join(", ")
    }
}

/// Name fragment identifying a type inside generated type names
fn mangle(ty: &Type) -> String {
    match ty {
        Type::Number | Type::Unknown => "int".to_string(),
        Type::Character => "char".to_string(),
        Type::Boolean => "bool".to_string(),
        Type::Void => "void".to_string(),
        Type::Array(elem) => format!("array_{}", mangle(elem)),
        Type::Function { params, ret } => {
            let mut parts: Vec<String> = params.iter().map(mangle).collect();
            parts.push(mangle(ret));
            format!("fn_{}", parts.join("_"))
        }
    }
}

fn lowers_to_int_main(func: &FunctionDecl) -> bool {
    func.name == ENTRY_POINT && func.return_type.is_void()
}

fn signature(func: &FunctionDecl) -> String {
    let ret = if lowers_to_int_main(func) {
        "int".to_string()
    } else {
        c_type(&func.return_type)
    };
    let params = if func.params.is_empty() {
        "void".to_string()
    } else {
        func.params
            .iter()
            .map(|p| declarator(&p.ty, &c_ident(&p.name)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{} {}({})", ret, c_ident(&func.name), params)
}

/// Every array type the program mentions, element types before the arrays
/// built from them
fn collect_array_types(program: &Program) -> Vec<Type> {
    fn visit(ty: &Type, seen: &mut HashSet<Type>, out: &mut Vec<Type>) {
        match ty {
            Type::Array(elem) => {
                visit(elem, seen, out);
                if seen.insert(ty.clone()) {
                    out.push(ty.clone());
                }
            }
            Type::Function { params, ret } => {
                for param in params {
                    visit(param, seen, out);
                }
                visit(ret, seen, out);
            }
            _ => {}
        }
    }

    fn visit_stmts(stmts: &[Stmt], seen: &mut HashSet<Type>, out: &mut Vec<Type>) {
        for stmt in stmts {
            match stmt {
                Stmt::Var(decl) => visit(&decl.ty, seen, out),
                Stmt::If(s) => {
                    visit_stmts(&s.then_branch, seen, out);
                    if let Some(else_branch) = &s.else_branch {
                        visit_stmts(else_branch, seen, out);
                    }
                }
                Stmt::While(s) => visit_stmts(&s.body, seen, out),
                Stmt::For(s) => visit_stmts(&s.body, seen, out),
                Stmt::ForEach(s) => {
                    visit(&s.var_type, seen, out);
                    visit_stmts(&s.body, seen, out);
                }
                Stmt::Assign(_) | Stmt::Call(_) | Stmt::Return(_) => {}
            }
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in &program.items {
        match item {
            Item::Var(decl) => visit(&decl.ty, &mut seen, &mut out),
            Item::Function(func) => {
                visit(&func.signature(), &mut seen, &mut out);
                visit_stmts(&func.body, &mut seen, &mut out);
            }
        }
    }
    out
}

// ==================== Expressions ====================

/// Convert binary operator to C operator
fn binop_to_c(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn expr_to_c(expr: &Expr) -> String {
    match expr {
        Expr::Number { value } if *value < 0 => format!("({})", value),
        Expr::Number { value } => value.to_string(),
        Expr::Character { value } => char_literal(*value),
        Expr::Boolean { value } => if *value { "true" } else { "false" }.to_string(),
        Expr::Var { name } => c_ident(name),
        Expr::Binary { op, left, right } => format!(
            "{} {} {}",
            binary_operand(left),
            binop_to_c(*op),
            binary_operand(right)
        ),
        Expr::Not { expr } => format!("!{}", unary_operand(expr)),
        Expr::Neg { expr } => format!("-{}", unary_operand(expr)),
        Expr::Call(call) => call_to_c(call),
    }
}

/// Nested binary expressions are always parenthesized, so C precedence
/// never regroups what the tree grouped
fn binary_operand(expr: &Expr) -> String {
    match expr {
        Expr::Binary { .. } => format!("({})", expr_to_c(expr)),
        _ => expr_to_c(expr),
    }
}

fn unary_operand(expr: &Expr) -> String {
    match expr {
        Expr::Binary { .. } | Expr::Not { .. } | Expr::Neg { .. } => {
            format!("({})", expr_to_c(expr))
        }
        _ => expr_to_c(expr),
    }
}

fn call_to_c(call: &Call) -> String {
    let args: Vec<String> = call.args.iter().map(expr_to_c).collect();
    format!("{}({})", c_ident(&call.name), args.join(", "))
}

fn assign_to_c(assign: &Assign) -> String {
    format!("{} = {}", c_ident(&assign.target), expr_to_c(&assign.value))
}

fn leading_space(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!(" {}", s)
    }
}

fn char_literal(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        '\n' => "'\\n'".to_string(),
        '\t' => "'\\t'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\0' => "'\\0'".to_string(),
        c if c == ' ' || c.is_ascii_graphic() => format!("'{}'", c),
        c if c <= MAX_CHARACTER => format!("'\\x{:02x}'", c as u32),
        // Does not fit in a C char; the analyzer reports these literals
        c => (c as u32).to_string(),
    }
}
