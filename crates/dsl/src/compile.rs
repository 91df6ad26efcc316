//! Slot-compiled expressions
//!
//! Variable names are resolved to dense slot indices once at scenario
//! construction; per-trial evaluation is a pure tree walk over `f64`
//! slots with zero allocation.

use thiserror::Error;

use crate::ast::{BinaryOp, Expr, UnaryOp};

/// A variable reference that could not be resolved to a slot
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown variable `{name}` in expression")]
pub struct UnknownVariable {
    pub name: String,
}

/// An expression with variable references resolved to slot indices
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledExpr {
    Literal(f64),
    Slot(usize),
    Unary {
        op: UnaryOp,
        operand: Box<CompiledExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<CompiledExpr>,
        right: Box<CompiledExpr>,
    },
}

impl Expr {
    /// Resolve every variable reference through `resolve`, producing the
    /// evaluable form. Fails on the first name `resolve` does not know.
    pub fn compile<F>(&self, resolve: &F) -> Result<CompiledExpr, UnknownVariable>
    where
        F: Fn(&str) -> Option<usize>,
    {
        match self {
            Expr::Literal(value) => Ok(CompiledExpr::Literal(*value)),
            Expr::Var(name) => resolve(name)
                .map(CompiledExpr::Slot)
                .ok_or_else(|| UnknownVariable { name: name.clone() }),
            Expr::Unary { op, operand } => Ok(CompiledExpr::Unary {
                op: *op,
                operand: Box::new(operand.compile(resolve)?),
            }),
            Expr::Binary { op, left, right } => Ok(CompiledExpr::Binary {
                op: *op,
                left: Box::new(left.compile(resolve)?),
                right: Box::new(right.compile(resolve)?),
            }),
        }
    }
}

impl CompiledExpr {
    /// Evaluate against one trial's variable slots.
    ///
    /// Division by zero (including `x/0`, which IEEE would send to
    /// `±inf`) yields `NaN`: the sentinel for a degenerate output on
    /// this trial only. Evaluation itself never fails; the analyzer
    /// accounts for non-finite outputs.
    pub fn eval(&self, slots: &[f64]) -> f64 {
        match self {
            CompiledExpr::Literal(value) => *value,
            CompiledExpr::Slot(index) => slots[*index],
            CompiledExpr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => -operand.eval(slots),
            CompiledExpr::Binary { op, left, right } => {
                let l = left.eval(slots);
                let r = right.eval(slots);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            f64::NAN
                        } else {
                            l / r
                        }
                    }
                    BinaryOp::Pow => l.powf(r),
                }
            }
        }
    }
}
