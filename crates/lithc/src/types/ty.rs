//! Value types of the Lithium language
//!
//! Types are small immutable values compared structurally. Each carries an
//! `inferred` flag recording whether it was deduced from context or written
//! by the programmer; the flag never takes part in equality.

use std::fmt;

/// Built-in primitive types, one per type keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Float,
    String,
    Bool,
    /// Compatible with every other type
    Any,
    /// No value; also the recovery placeholder after a failed check
    Void,
}

impl PrimitiveType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "bool" => Self::Bool,
            "any" => Self::Any,
            "void" => Self::Void,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Any => "any",
            Self::Void => "void",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Implicit one-directional conversion (only `int` widens to `float`)
    pub fn can_implicitly_convert(from: Self, to: Self) -> bool {
        from == to || matches!((from, to), (Self::Int, Self::Float))
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parameter and return types of a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub ret: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Function(Box<FunctionSignature>),
}

/// A Lithium type plus its provenance
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub inferred: bool,
}

impl Type {
    pub fn new(kind: TypeKind, inferred: bool) -> Self {
        Self { kind, inferred }
    }

    /// Explicitly declared primitive
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self::new(TypeKind::Primitive(primitive), false)
    }

    /// Primitive deduced from context
    pub fn inferred(primitive: PrimitiveType) -> Self {
        Self::new(TypeKind::Primitive(primitive), true)
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::new(
            TypeKind::Function(Box::new(FunctionSignature { params, ret })),
            false,
        )
    }

    pub fn int() -> Self {
        Self::primitive(PrimitiveType::Int)
    }

    pub fn float() -> Self {
        Self::primitive(PrimitiveType::Float)
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveType::String)
    }

    pub fn bool() -> Self {
        Self::primitive(PrimitiveType::Bool)
    }

    pub fn any() -> Self {
        Self::primitive(PrimitiveType::Any)
    }

    pub fn void() -> Self {
        Self::primitive(PrimitiveType::Void)
    }

    /// Placeholder returned after a reported error so inference can continue
    pub fn recovery() -> Self {
        Self::inferred(PrimitiveType::Void)
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            TypeKind::Function(_) => None,
        }
    }

    pub fn signature(&self) -> Option<&FunctionSignature> {
        match &self.kind {
            TypeKind::Function(sig) => Some(sig),
            TypeKind::Primitive(_) => None,
        }
    }

    pub fn is_any(&self) -> bool {
        self.as_primitive() == Some(PrimitiveType::Any)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().is_some_and(PrimitiveType::is_numeric)
    }

    /// An inferred `void` only ever comes out of error recovery
    pub fn is_recovery(&self) -> bool {
        self.inferred && self.as_primitive() == Some(PrimitiveType::Void)
    }

    /// `float` if either side is `float`, otherwise `int`; `None` for non-numeric input
    pub fn wider_numeric(a: &Type, b: &Type) -> Option<PrimitiveType> {
        match (a.as_primitive()?, b.as_primitive()?) {
            (PrimitiveType::Int, PrimitiveType::Int) => Some(PrimitiveType::Int),
            (PrimitiveType::Float | PrimitiveType::Int, PrimitiveType::Float | PrimitiveType::Int) => {
                Some(PrimitiveType::Float)
            }
            _ => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Type {}

impl From<PrimitiveType> for Type {
    fn from(primitive: PrimitiveType) -> Self {
        Self::primitive(primitive)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(p) => write!(f, "{p}"),
            TypeKind::Function(sig) => {
                f.write_str("fn(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", sig.ret)
            }
        }
    }
}
