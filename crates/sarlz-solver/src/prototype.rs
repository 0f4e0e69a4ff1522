//! Signature model: formal parameters, signatures and overload identity.
//!
//! - [`ParameterSpec`] / [`Signature`] keep everything a declaration says
//!   about its formal parameters (names, types, default values, varargs).
//! - [`ActionParameterTypes`] is the comparable projection of a signature:
//!   erased types plus the trailing varargs flag. Names and default values
//!   are not part of it.
//! - [`ActionPrototype`] pairs an action name with its parameter types and
//!   is the key used for override matching and duplicate detection.

use crate::types::{ErasedType, Expr, Name, TypeRef};
use sarlz_common::diagnostics::{Diagnostic, diagnostic_codes};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ParameterSpec
// =============================================================================

/// One formal parameter of a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: Name,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub has_default_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Expr>,
    #[serde(default)]
    pub is_varargs: bool,
}

impl ParameterSpec {
    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default_value: false,
            default_value: None,
            is_varargs: false,
        }
    }

    /// Attach a default value expression.
    pub fn with_default(mut self, expr: Expr) -> Self {
        self.has_default_value = true;
        self.default_value = Some(expr);
        self
    }

    /// Mark the parameter as defaulted when the expression is not available
    /// (e.g. a parameter read back from compiled code).
    pub fn with_default_flag(mut self) -> Self {
        self.has_default_value = true;
        self
    }

    /// Mark the parameter as variadic. `ty` is the element type.
    pub fn varargs(mut self) -> Self {
        self.is_varargs = true;
        self
    }
}

// =============================================================================
// InvalidSignatureError
// =============================================================================

/// A parameter list that violates the varargs/default-value invariants.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSignatureError {
    #[error("formal parameters '{first}' and '{second}' are both variadic")]
    MultipleVarargs { first: Name, second: Name },
    #[error("variadic parameter '{name}' at position {position} is not the last formal parameter")]
    VarargsNotLast { name: Name, position: usize },
    #[error("variadic parameter '{name}' cannot have a default value")]
    VarargsWithDefault { name: Name, position: usize },
}

impl InvalidSignatureError {
    pub const fn code(&self) -> u32 {
        match self {
            Self::MultipleVarargs { .. } => diagnostic_codes::MULTIPLE_VARIADIC_PARAMETERS,
            Self::VarargsNotLast { .. } => diagnostic_codes::VARIADIC_PARAMETER_NOT_LAST,
            Self::VarargsWithDefault { .. } => {
                diagnostic_codes::VARIADIC_PARAMETER_WITH_DEFAULT_VALUE
            }
        }
    }

    /// Report this error against the offending declaration.
    pub fn to_diagnostic(&self, file: &str, start: u32, length: u32) -> Diagnostic {
        let args: Vec<&str> = match self {
            Self::MultipleVarargs { first, second } => vec![&**first, &**second],
            Self::VarargsNotLast { name, .. } | Self::VarargsWithDefault { name, .. } => {
                vec![&**name]
            }
        };
        Diagnostic::from_code(file.to_string(), start, length, self.code(), &args)
    }
}

// =============================================================================
// FormalParameterProvider
// =============================================================================

/// Positional view over the formal parameters of a declaration.
///
/// Implemented by the front end for its declaration nodes, and by
/// [`Signature`] itself.
pub trait FormalParameterProvider {
    fn formal_parameter_count(&self) -> usize;

    fn formal_parameter_name(&self, position: usize) -> Name;

    /// Declared type; the element type for a variadic parameter.
    fn formal_parameter_type(&self, position: usize) -> TypeRef;

    fn has_formal_parameter_default_value(&self, position: usize) -> bool;

    fn formal_parameter_default_value(&self, position: usize) -> Option<Expr>;

    fn is_formal_parameter_varargs(&self, position: usize) -> bool;
}

// =============================================================================
// Signature
// =============================================================================

/// Validated, immutable formal parameter list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParameterSpec>", into = "Vec<ParameterSpec>")]
pub struct Signature {
    params: SmallVec<[ParameterSpec; 4]>,
}

impl Signature {
    /// Build a signature, rejecting misplaced or defaulted varargs.
    pub fn new(
        params: impl IntoIterator<Item = ParameterSpec>,
    ) -> Result<Self, InvalidSignatureError> {
        let params: SmallVec<[ParameterSpec; 4]> = params.into_iter().collect();
        validate(&params)?;
        Ok(Self { params })
    }

    /// The empty parameter list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a declaration through its formal-parameter view.
    pub fn from_provider<P: FormalParameterProvider + ?Sized>(
        provider: &P,
    ) -> Result<Self, InvalidSignatureError> {
        let count = provider.formal_parameter_count();
        Self::new((0..count).map(|i| ParameterSpec {
            name: provider.formal_parameter_name(i),
            ty: provider.formal_parameter_type(i),
            has_default_value: provider.has_formal_parameter_default_value(i),
            default_value: provider.formal_parameter_default_value(i),
            is_varargs: provider.is_formal_parameter_varargs(i),
        }))
    }

    /// Caller guarantees `params` came from a valid signature.
    pub(crate) fn from_validated(params: SmallVec<[ParameterSpec; 4]>) -> Self {
        debug_assert!(validate(&params).is_ok());
        Self { params }
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn get(&self, position: usize) -> Option<&ParameterSpec> {
        self.params.get(position)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `true` when the last parameter is variadic.
    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_varargs)
    }

    /// Positions of the parameters that may be omitted by callers.
    pub fn default_positions(&self) -> SmallVec<[usize; 8]> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_default_value && !p.is_varargs)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_default_values(&self) -> bool {
        self.params.iter().any(|p| p.has_default_value)
    }

    /// Erase every parameter type; only the last position contributes the
    /// varargs flag.
    pub fn parameter_types(&self) -> ActionParameterTypes {
        ActionParameterTypes {
            types: self.params.iter().map(|p| p.ty.erasure()).collect(),
            varargs: self.is_varargs(),
        }
    }

    /// Same parameters with every type rewritten by `map`.
    pub fn map_types(&self, mut map: impl FnMut(&TypeRef) -> TypeRef) -> Self {
        Self {
            params: self
                .params
                .iter()
                .map(|p| ParameterSpec {
                    ty: map(&p.ty),
                    ..p.clone()
                })
                .collect(),
        }
    }
}

fn validate(params: &[ParameterSpec]) -> Result<(), InvalidSignatureError> {
    let mut varargs_at: Option<usize> = None;
    for (position, param) in params.iter().enumerate() {
        if !param.is_varargs {
            continue;
        }
        if let Some(first) = varargs_at {
            return Err(InvalidSignatureError::MultipleVarargs {
                first: params[first].name.clone(),
                second: param.name.clone(),
            });
        }
        if param.has_default_value {
            return Err(InvalidSignatureError::VarargsWithDefault {
                name: param.name.clone(),
                position,
            });
        }
        varargs_at = Some(position);
    }
    match varargs_at {
        Some(position) if position + 1 != params.len() => {
            Err(InvalidSignatureError::VarargsNotLast {
                name: params[position].name.clone(),
                position,
            })
        }
        _ => Ok(()),
    }
}

impl TryFrom<Vec<ParameterSpec>> for Signature {
    type Error = InvalidSignatureError;

    fn try_from(params: Vec<ParameterSpec>) -> Result<Self, Self::Error> {
        Self::new(params)
    }
}

impl From<Signature> for Vec<ParameterSpec> {
    fn from(signature: Signature) -> Self {
        signature.params.into_vec()
    }
}

impl FormalParameterProvider for Signature {
    fn formal_parameter_count(&self) -> usize {
        self.params.len()
    }

    fn formal_parameter_name(&self, position: usize) -> Name {
        self.params[position].name.clone()
    }

    fn formal_parameter_type(&self, position: usize) -> TypeRef {
        self.params[position].ty.clone()
    }

    fn has_formal_parameter_default_value(&self, position: usize) -> bool {
        self.params[position].has_default_value
    }

    fn formal_parameter_default_value(&self, position: usize) -> Option<Expr> {
        self.params[position].default_value.clone()
    }

    fn is_formal_parameter_varargs(&self, position: usize) -> bool {
        self.params[position].is_varargs
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} : {}", p.name, p.ty)?;
            if p.is_varargs {
                f.write_str("*")?;
            }
            if let Some(value) = &p.default_value {
                write!(f, " = {value}")?;
            }
        }
        f.write_str(")")
    }
}

// =============================================================================
// ActionParameterTypes
// =============================================================================

/// Erased parameter types plus the trailing varargs flag.
///
/// Ordering is lexicographic over the erased names; for an equal sequence
/// the non-variadic form sorts first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionParameterTypes {
    types: SmallVec<[ErasedType; 4]>,
    varargs: bool,
}

impl ActionParameterTypes {
    pub fn new(types: impl IntoIterator<Item = ErasedType>, varargs: bool) -> Self {
        let types: SmallVec<[ErasedType; 4]> = types.into_iter().collect();
        Self {
            varargs: varargs && !types.is_empty(),
            types,
        }
    }

    pub fn types(&self) -> &[ErasedType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub const fn is_varargs(&self) -> bool {
        self.varargs
    }
}

impl fmt::Display for ActionParameterTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(ty.as_str())?;
        }
        if self.varargs {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Malformed textual prototype or parameter-type list.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParsePrototypeError {
    #[error("empty type name at position {0}")]
    EmptyType(usize),
    #[error("only the last parameter type may be variadic (position {0})")]
    MisplacedVarargs(usize),
    #[error("missing parameter list in '{0}'")]
    MissingParameterList(String),
}

impl FromStr for ActionParameterTypes {
    type Err = ParsePrototypeError;

    /// Parse the `java.lang.String,float,java.lang.Object*` form.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        let last = parts.len() - 1;
        let mut varargs = false;
        let mut types = SmallVec::with_capacity(parts.len());
        for (i, part) in parts.into_iter().enumerate() {
            let name = match part.strip_suffix('*') {
                Some(stripped) if i == last => {
                    varargs = true;
                    stripped
                }
                Some(_) => return Err(ParsePrototypeError::MisplacedVarargs(i)),
                None => part,
            };
            if name.is_empty() {
                return Err(ParsePrototypeError::EmptyType(i));
            }
            types.push(ErasedType::new(name));
        }
        Ok(Self { types, varargs })
    }
}

impl Serialize for ActionParameterTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionParameterTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// ActionPrototype
// =============================================================================

/// Identity of one overload within its owning type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionPrototype {
    pub name: Name,
    pub params: ActionParameterTypes,
}

impl ActionPrototype {
    pub fn new(name: impl Into<Name>, params: ActionParameterTypes) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn from_signature(name: impl Into<Name>, signature: &Signature) -> Self {
        Self::new(name, signature.parameter_types())
    }
}

impl fmt::Display for ActionPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params)
    }
}

impl FromStr for ActionPrototype {
    type Err = ParsePrototypeError;

    /// Parse the `name(java.lang.String,float*)` form.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let (name, rest) = text
            .split_once('(')
            .ok_or_else(|| ParsePrototypeError::MissingParameterList(text.to_string()))?;
        let params = rest
            .strip_suffix(')')
            .ok_or_else(|| ParsePrototypeError::MissingParameterList(text.to_string()))?;
        Ok(Self::new(name.trim(), params.parse()?))
    }
}

impl Serialize for ActionPrototype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionPrototype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Default value identifiers
// =============================================================================

/// Name of the synthetic member holding the default value of one parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefaultValueId {
    pub owner: Name,
    pub action: Name,
    pub position: usize,
}

impl DefaultValueId {
    pub const FIELD_PREFIX: &'static str = "$DEFAULT_VALUE$";

    pub fn new(owner: impl Into<Name>, action: impl Into<Name>, position: usize) -> Self {
        Self {
            owner: owner.into(),
            action: action.into(),
            position,
        }
    }

    /// `INFLUENCEKINEMATIC_0`
    pub fn key(&self) -> String {
        format!("{}_{}", self.action.to_uppercase(), self.position)
    }

    /// `$DEFAULT_VALUE$INFLUENCEKINEMATIC_0`
    pub fn field_name(&self) -> String {
        format!("{}{}", Self::FIELD_PREFIX, self.key())
    }
}

impl fmt::Display for DefaultValueId {
    /// `PhysicEnvironment#INFLUENCEKINEMATIC_0`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.key())
    }
}

#[cfg(test)]
#[path = "../tests/prototype_tests.rs"]
mod tests;
