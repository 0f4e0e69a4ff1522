//! Type references, erasure, and expression values.
//!
//! The solver never inspects the inside of a type beyond what overload
//! identity and substitution need: an identity, an erasure, and whether the
//! reference denotes a type parameter. `TypeRef` is therefore a small closed
//! enum instead of a full type representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared, immutable name (qualified type name, parameter name, action name).
pub type Name = Arc<str>;

/// Well-known type names the solver has policy for.
pub mod well_known {
    pub const OBJECT: &str = "java.lang.Object";
    pub const STRING: &str = "java.lang.String";
    pub const BOXED_BOOLEAN: &str = "java.lang.Boolean";
    pub const BIG_DECIMAL: &str = "java.math.BigDecimal";

    pub const BOOLEAN: &str = "boolean";
    pub const BYTE: &str = "byte";
    pub const SHORT: &str = "short";
    pub const INT: &str = "int";
    pub const LONG: &str = "long";
    pub const FLOAT: &str = "float";
    pub const DOUBLE: &str = "double";
    pub const CHAR: &str = "char";
    pub const VOID: &str = "void";
}

// =============================================================================
// PrimitiveKind
// =============================================================================

/// JVM primitive types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
}

impl PrimitiveKind {
    /// Parse a primitive from its erased name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            well_known::BOOLEAN => Self::Boolean,
            well_known::BYTE => Self::Byte,
            well_known::SHORT => Self::Short,
            well_known::INT => Self::Int,
            well_known::LONG => Self::Long,
            well_known::FLOAT => Self::Float,
            well_known::DOUBLE => Self::Double,
            well_known::CHAR => Self::Char,
            well_known::VOID => Self::Void,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => well_known::BOOLEAN,
            Self::Byte => well_known::BYTE,
            Self::Short => well_known::SHORT,
            Self::Int => well_known::INT,
            Self::Long => well_known::LONG,
            Self::Float => well_known::FLOAT,
            Self::Double => well_known::DOUBLE,
            Self::Char => well_known::CHAR,
            Self::Void => well_known::VOID,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ErasedType
// =============================================================================

/// The generics-stripped identity of a type, used for overload identity.
///
/// Ordering is the plain string ordering of the erased name, which keeps
/// every map keyed by erased types deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErasedType(Name);

impl ErasedType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErasedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TypeRef
// =============================================================================

/// Identity of a type parameter: the declaring type and the parameter name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParamKey {
    pub owner: Name,
    pub name: Name,
}

impl TypeParamKey {
    pub fn new(owner: impl Into<Name>, name: impl Into<Name>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", self.owner, self.name)
    }
}

/// A reference to a type, as supplied by the external type system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    /// A concrete named type. Primitives are named types (`int`, `float`).
    Named { name: Name },
    /// A type parameter declared by `owner` (a type or an operation).
    Param {
        owner: Name,
        name: Name,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bound: Option<Box<TypeRef>>,
    },
    /// An array of `element`.
    Array { element: Box<TypeRef> },
    /// An instantiation of the generic type `base` with `args`.
    Generic { base: Name, args: Vec<TypeRef> },
}

impl TypeRef {
    pub fn named(name: impl Into<Name>) -> Self {
        Self::Named { name: name.into() }
    }

    pub fn object() -> Self {
        Self::named(well_known::OBJECT)
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::named(kind.name())
    }

    pub fn param(owner: impl Into<Name>, name: impl Into<Name>) -> Self {
        Self::Param {
            owner: owner.into(),
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded_param(owner: impl Into<Name>, name: impl Into<Name>, bound: TypeRef) -> Self {
        Self::Param {
            owner: owner.into(),
            name: name.into(),
            bound: Some(Box::new(bound)),
        }
    }

    pub fn array(element: TypeRef) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    pub fn generic(base: impl Into<Name>, args: Vec<TypeRef>) -> Self {
        Self::Generic {
            base: base.into(),
            args,
        }
    }

    /// `true` when this reference denotes a type parameter.
    pub const fn is_type_parameter(&self) -> bool {
        matches!(self, Self::Param { .. })
    }

    /// Key of the referenced type parameter, if this is one.
    pub fn param_key(&self) -> Option<TypeParamKey> {
        match self {
            Self::Param { owner, name, .. } => Some(TypeParamKey {
                owner: owner.clone(),
                name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Name of the declaration this reference points at, if it is nominal.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::Named { name } => Some(name),
            Self::Generic { base, .. } => Some(base),
            Self::Param { .. } | Self::Array { .. } => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Named { name } => PrimitiveKind::from_name(name),
            _ => None,
        }
    }

    /// The erased identity of this type.
    ///
    /// A type parameter erases to its bound, or to `java.lang.Object`
    /// when unbounded.
    pub fn erasure(&self) -> ErasedType {
        match self {
            Self::Named { name } => ErasedType(name.clone()),
            Self::Param { bound, .. } => match bound {
                Some(bound) => bound.erasure(),
                None => ErasedType::new(well_known::OBJECT),
            },
            Self::Array { element } => ErasedType::new(format!("{}[]", element.erasure())),
            Self::Generic { base, .. } => ErasedType(base.clone()),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name } => f.write_str(name),
            Self::Param { name, .. } => f.write_str(name),
            Self::Array { element } => write!(f, "{element}[]"),
            Self::Generic { base, args } => {
                write!(f, "{base}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

// =============================================================================
// Visibility
// =============================================================================

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    /// Members with this visibility are visible to subtypes.
    pub const fn is_inheritable(self) -> bool {
        !matches!(self, Self::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Package => "package",
            Self::Private => "private",
        })
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// Literal values the solver produces or forwards.
///
/// Floating-point literals keep their source digits so that the literal
/// stays hashable and renders byte-identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    /// `float` literal; rendered with an `f` suffix.
    Float(Name),
    /// `double` literal.
    Double(Name),
    Char(char),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(digits) => write!(f, "{digits}f"),
            Self::Double(digits) => f.write_str(digits),
            Self::Char('\0') => f.write_str("'\\0'"),
            Self::Char(c) => write!(f, "'{c}'"),
        }
    }
}

/// An expression handed over by the front end or built by the solver.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    Literal { value: Literal },
    /// Source text of an expression the solver does not look into.
    Source { text: Name },
    /// Narrowing primitive conversion, e.g. `(byte) 0`.
    Cast {
        target: PrimitiveKind,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub const fn literal(value: Literal) -> Self {
        Self::Literal { value }
    }

    pub fn source(text: impl Into<Name>) -> Self {
        Self::Source { text: text.into() }
    }

    pub fn cast(target: PrimitiveKind, operand: Expr) -> Self {
        Self::Cast {
            target,
            operand: Box::new(operand),
        }
    }

    /// The literal at the core of this expression, looking through casts.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal { value } => Some(value),
            Self::Cast { operand, .. } => operand.as_literal(),
            Self::Source { .. } => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { value } => write!(f, "{value}"),
            Self::Source { text } => f.write_str(text),
            Self::Cast { target, operand } => write!(f, "({target}) {operand}"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
