//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String, bool>` tracking
//!    declared/defined).
//! 2. Report static errors (redeclaration, read in own initializer, misplaced
//!    `return`/`this`/`super`, self‑inheritance).  Errors never stop the walk.
//! 3. Tell the interpreter, for *each* variable/this/super occurrence, whether
//!    it is a local (and at what depth) or a global, so the interpreter never
//!    falls back to dynamic lookup that would see a later shadowing local.
//!
//! The enclosing function and class kinds travel down the walk as a
//! [`Context`] value, so nested bodies restore the outer context simply by
//! returning.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt, VarRef};
use crate::class::INITIALIZER;
use crate::error::{LoxError, Reporter};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

/// What kind of class body are we in?  Used to validate `this`/`super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Copy, Clone, Debug)]
struct Context {
    function: FunctionType,
    class: ClassType,
}

impl Context {
    const TOP_LEVEL: Context = Context {
        function: FunctionType::None,
        class: ClassType::None,
    };
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'i, 'r> {
    interpreter: &'i mut Interpreter,
    reporter: &'r mut dyn Reporter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
}

impl<'i, 'r> Resolver<'i, 'r> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'i mut Interpreter, reporter: &'r mut dyn Reporter) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            reporter,
            scopes: Vec::new(),
        }
    }

    /// Walk all top‑level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.scopes.clear();
        self.resolve_all(statements, Context::TOP_LEVEL);
    }

    fn resolve_all(&mut self, statements: &[Stmt], ctx: Context) {
        for stmt in statements {
            self.resolve_stmt(stmt, ctx);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt, ctx: Context) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_all(statements, ctx);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr, ctx);
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // The name is visible inside its own body (recursion).
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function, ctx);
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods, ctx),

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr, ctx);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition, ctx);
                self.resolve_stmt(then_branch, ctx);
                if let Some(else_branch) = else_branch.as_deref() {
                    self.resolve_stmt(else_branch, ctx);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition, ctx);
                self.resolve_stmt(body, ctx);
            }

            Stmt::Return { keyword, value } => {
                if ctx.function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if ctx.function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr, ctx);
                }
            }
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&VarRef>,
        methods: &[Rc<FunctionDecl>],
        ctx: Context,
    ) {
        debug!("Resolving class '{}'", name.lexeme);

        let mut class_ctx = Context {
            class: ClassType::Class,
            ..ctx
        };

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if superclass.name.lexeme == name.lexeme {
                self.error(&superclass.name, "A class can't inherit from itself.");
            }

            class_ctx.class = ClassType::Subclass;
            self.resolve_local(superclass.id, &superclass.name);

            self.begin_scope();
            self.bind_synthetic("super");
        }

        self.begin_scope();
        self.bind_synthetic("this");

        for method in methods {
            let kind = if method.name.lexeme == INITIALIZER {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(method, kind, class_ctx);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr, ctx: Context) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner, ctx),

            Expr::Unary { right, .. } => self.resolve_expr(right, ctx),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left, ctx);
                self.resolve_expr(right, ctx);
            }

            Expr::Variable(var) => {
                let declared_only: bool = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&var.name.lexeme))
                    == Some(&false);

                if declared_only {
                    self.error(
                        &var.name,
                        "Can't read local variable in its own initializer.",
                    );
                }

                self.resolve_local(var.id, &var.name);
            }

            Expr::Assign { target, value } => {
                self.resolve_expr(value, ctx);
                self.resolve_local(target.id, &target.name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee, ctx);
                for argument in arguments {
                    self.resolve_expr(argument, ctx);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object, ctx),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value, ctx);
                self.resolve_expr(object, ctx);
            }

            Expr::This(keyword) => {
                if ctx.class == ClassType::None {
                    self.error(&keyword.name, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(keyword.id, &keyword.name);
            }

            Expr::Super { keyword, .. } => {
                match ctx.class {
                    ClassType::None => {
                        self.error(&keyword.name, "Can't use 'super' outside of a class.");
                    }
                    ClassType::Class => {
                        self.error(
                            &keyword.name,
                            "Can't use 'super' in a class with no superclass.",
                        );
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(keyword.id, &keyword.name);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.
    fn resolve_function(&mut self, function: &FunctionDecl, kind: FunctionType, ctx: Context) {
        let body_ctx = Context {
            function: kind,
            ..ctx
        };

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_all(&function.body, body_ctx);
        self.end_scope();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        let duplicate: bool = scope.insert(name.lexeme.clone(), false).is_some();

        if duplicate {
            self.error(name, "Already a variable with this name in this scope.");
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Bind `this` / `super` in the innermost scope.
    fn bind_synthetic(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.reporter.report(LoxError::resolve(token, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as either:
    ///  - a local at depth `d`, or
    ///  - a global if not found in *any* scope.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' {} at depth {}", name.lexeme, id, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' {} as global", name.lexeme, id);

        self.interpreter.note_global(id);
    }
}
