//! Type system shared by the analyzer and downstream consumers
//!
//! Primitive types plus function signatures, with structural equality.

mod ty;

pub use ty::{FunctionSignature, PrimitiveType, Type, TypeKind};
