//! Canonical default expressions for omitted arguments.
//!
//! Only the erased type decides the default; no signature is needed, so the
//! emitter can use this table directly as well.

use crate::types::{Expr, Literal, PrimitiveKind, TypeRef, well_known};
use serde::Serialize;

/// Default expression for one type, and whether it is a plain literal
/// (no cast needed at the call site).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultExpression {
    pub expr: Expr,
    pub is_literal: bool,
}

impl DefaultExpression {
    fn literal(value: Literal) -> Self {
        Self {
            expr: Expr::literal(value),
            is_literal: true,
        }
    }

    fn narrowed(target: PrimitiveKind) -> Self {
        Self {
            expr: Expr::cast(target, Expr::literal(Literal::Integer(0))),
            is_literal: false,
        }
    }
}

pub fn default_expression_for(ty: &TypeRef) -> DefaultExpression {
    default_expression_for_name(ty.erasure().as_str())
}

/// Default expression for an erased type name.
pub fn default_expression_for_name(erased: &str) -> DefaultExpression {
    match PrimitiveKind::from_name(erased) {
        Some(PrimitiveKind::Boolean) => DefaultExpression::literal(Literal::Boolean(false)),
        Some(kind @ (PrimitiveKind::Byte | PrimitiveKind::Short)) => {
            DefaultExpression::narrowed(kind)
        }
        Some(PrimitiveKind::Int | PrimitiveKind::Long) => {
            DefaultExpression::literal(Literal::Integer(0))
        }
        Some(PrimitiveKind::Float) => DefaultExpression::literal(Literal::Float("0.0".into())),
        Some(PrimitiveKind::Double) => DefaultExpression::literal(Literal::Double("0.0".into())),
        Some(PrimitiveKind::Char) => DefaultExpression::literal(Literal::Char('\0')),
        None if erased == well_known::BOXED_BOOLEAN => {
            DefaultExpression::literal(Literal::Boolean(false))
        }
        None if erased == well_known::BIG_DECIMAL => {
            DefaultExpression::literal(Literal::Double("0.0".into()))
        }
        // `void` is never a parameter type; treat it like a reference.
        Some(PrimitiveKind::Void) | None => DefaultExpression::literal(Literal::Null),
    }
}

#[cfg(test)]
#[path = "../tests/defaults_tests.rs"]
mod tests;
