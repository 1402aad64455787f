//! Lithium type checking
//!
//! Every check reports its own diagnostics and still hands back a type, so a
//! caller can keep inferring after an error. A reported failure yields
//! [`Type::recovery`], and checks involving a recovery type stay silent.

use crate::common::{CompileError, DiagnosticReporter, Position, Span};
use crate::frontend::ast::{BinaryOp, Expr, ExprKind};
use crate::types::{PrimitiveType, Type};

use super::SymbolTable;

/// Type checker for Lithium expressions
pub struct TypeChecker;

impl TypeChecker {
    pub fn new() -> Self {
        Self
    }

    /// Infer the type of `expr` against the visible symbols
    pub fn infer_type(
        &self,
        expr: &Expr,
        symbols: &SymbolTable,
        reporter: &mut DiagnosticReporter,
    ) -> Type {
        match &expr.kind {
            ExprKind::Number { is_float, .. } => Type::inferred(if *is_float {
                PrimitiveType::Float
            } else {
                PrimitiveType::Int
            }),
            ExprKind::String(_) => Type::inferred(PrimitiveType::String),
            ExprKind::Identifier(name) => match symbols.lookup_symbol(name) {
                Some(symbol) => symbol.ty.clone(),
                None => {
                    reporter.report_error(CompileError::semantic(
                        format!("undeclared identifier '{name}'"),
                        expr.position.clone(),
                        expr.span,
                    ));
                    Type::recovery()
                }
            },
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.infer_type(left, symbols, reporter);
                let right_ty = self.infer_type(right, symbols, reporter);
                self.check_binary_operation(*op, &left_ty, &right_ty, &expr.position, expr.span, reporter)
            }
            ExprKind::Call { name, args } => {
                self.validate_function_call(name, args, symbols, &expr.position, expr.span, reporter)
            }
        }
    }

    /// Check that a value of type `actual` may be used where `expected` is required.
    ///
    /// Accepts identical types, `any` on either side, and `int` to `float`
    /// widening. Anything else is a type error at `position`.
    pub fn check_type_compatibility(
        &self,
        expected: &Type,
        actual: &Type,
        position: &Position,
        span: Span,
        reporter: &mut DiagnosticReporter,
    ) -> bool {
        if self.is_compatible(expected, actual) {
            return true;
        }
        if !actual.is_recovery() && !expected.is_recovery() {
            reporter.report_error(CompileError::type_error(
                format!("type mismatch: expected '{expected}', found '{actual}'"),
                position.clone(),
                span,
            ));
        }
        false
    }

    /// Compatibility without reporting
    pub fn is_compatible(&self, expected: &Type, actual: &Type) -> bool {
        if expected.is_any() || actual.is_any() || expected == actual {
            return true;
        }
        match (expected.as_primitive(), actual.as_primitive()) {
            (Some(to), Some(from)) => PrimitiveType::can_implicitly_convert(from, to),
            _ => false,
        }
    }

    /// Result type of `left op right`.
    ///
    /// Arithmetic needs numeric (or `any`) operands and yields the wider
    /// numeric type, or `any` when either side is `any`.
    pub fn check_binary_operation(
        &self,
        op: BinaryOp,
        left: &Type,
        right: &Type,
        position: &Position,
        span: Span,
        reporter: &mut DiagnosticReporter,
    ) -> Type {
        if left.is_recovery() || right.is_recovery() {
            return Type::recovery();
        }

        let operand_ok = |ty: &Type| ty.is_numeric() || ty.is_any();
        if !operand_ok(left) || !operand_ok(right) {
            reporter.report_error(CompileError::type_error(
                format!("invalid operands to '{op}': '{left}' and '{right}'"),
                position.clone(),
                span,
            ));
            return Type::recovery();
        }

        if left.is_any() || right.is_any() {
            return Type::inferred(PrimitiveType::Any);
        }
        Type::wider_numeric(left, right).map_or_else(Type::recovery, Type::inferred)
    }

    /// Check a call of `name` with `args` and return the callee's result type.
    ///
    /// Problems with the callee are reported first, then each argument is
    /// inferred and checked in order, so diagnostics follow the source. Every
    /// argument is inferred even when the call itself is invalid.
    pub fn validate_function_call(
        &self,
        name: &str,
        args: &[Expr],
        symbols: &SymbolTable,
        position: &Position,
        span: Span,
        reporter: &mut DiagnosticReporter,
    ) -> Type {
        let mut result = Type::recovery();
        let mut signature = None;

        match symbols.lookup_symbol(name) {
            None => reporter.report_error(CompileError::semantic(
                format!("undeclared function '{name}'"),
                position.clone(),
                span,
            )),
            Some(symbol) if symbol.ty.is_any() => result = Type::inferred(PrimitiveType::Any),
            Some(symbol) => match symbol.ty.signature() {
                Some(sig) => {
                    if sig.params.len() != args.len() {
                        reporter.report_error(CompileError::semantic(
                            format!(
                                "function '{name}' expects {} argument{}, found {}",
                                sig.params.len(),
                                if sig.params.len() == 1 { "" } else { "s" },
                                args.len()
                            ),
                            position.clone(),
                            span,
                        ));
                    }
                    result = sig.ret.clone();
                    signature = Some(sig);
                }
                None if symbol.ty.is_recovery() => {}
                None => reporter.report_error(CompileError::semantic(
                    format!("'{name}' is not a function (it has type '{}')", symbol.ty),
                    position.clone(),
                    span,
                )),
            },
        }

        for (index, arg) in args.iter().enumerate() {
            let arg_ty = self.infer_type(arg, symbols, reporter);
            if let Some(param) = signature.and_then(|sig| sig.params.get(index)) {
                self.check_type_compatibility(param, &arg_ty, &arg.position, arg.span, reporter);
            }
        }

        result
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
