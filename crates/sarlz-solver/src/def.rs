//! Type declarations and their storage.
//!
//! The declaration store is the arena the inheritance resolver walks: each
//! class or interface is registered once, gets an opaque [`DeclId`], and is
//! then only read. Ancestor references stay as [`TypeRef`]s (they carry the
//! type arguments supplied at the extension point) and are resolved to ids
//! through the [`AncestorGraph`] trait.
//!
//! ## `DeclId` allocation
//!
//! Ids are allocated sequentially per store; `0` is never handed out.

use crate::prototype::Signature;
use crate::types::{Name, TypeRef, Visibility, well_known};
use bitflags::bitflags;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::{trace, warn};

/// Global counter for assigning instance ids to `DeclarationStore`s.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DeclId
// =============================================================================

/// Opaque identifier of a registered type declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Sentinel value for an invalid `DeclId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DeclId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }

    /// Dense index for bitsets sized by the store length.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
}

/// A declared type parameter, `<T extends Bound>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParamDecl {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<TypeRef>,
}

impl TypeParamDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded(name: impl Into<Name>, bound: TypeRef) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }

    /// Reference to this parameter as declared by `owner`.
    pub fn to_ref(&self, owner: &Name) -> TypeRef {
        match &self.bound {
            Some(bound) => TypeRef::bounded_param(owner.clone(), self.name.clone(), bound.clone()),
            None => TypeRef::param(owner.clone(), self.name.clone()),
        }
    }
}

bitflags! {
    /// Modifiers of a declared operation that affect inheritance.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OperationFlags: u8 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const STATIC = 1 << 2;
        /// Generated by the compiler (e.g. a synthesized default-value overload).
        const SYNTHETIC = 1 << 3;
    }
}

impl Default for OperationFlags {
    fn default() -> Self {
        Self::empty()
    }
}

fn void_type() -> TypeRef {
    TypeRef::named(well_known::VOID)
}

/// An operation (action) declared on a type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDecl {
    pub name: Name,
    #[serde(default)]
    pub signature: Signature,
    #[serde(default = "void_type")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub flags: OperationFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParamDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
}

impl OperationDecl {
    pub fn new(name: impl Into<Name>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            return_type: void_type(),
            visibility: Visibility::Public,
            flags: OperationFlags::empty(),
            type_params: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flags(mut self, flags: OperationFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamDecl>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<TypeRef>) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(OperationFlags::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(OperationFlags::FINAL)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(OperationFlags::STATIC)
    }

    pub fn is_synthetic(&self) -> bool {
        self.flags.contains(OperationFlags::SYNTHETIC)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDecl {
    pub name: Name,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorDecl {
    #[serde(default)]
    pub signature: Signature,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
}

impl ConstructorDecl {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            visibility: Visibility::Public,
            exceptions: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<TypeRef>) -> Self {
        self.exceptions = exceptions;
        self
    }
}

/// A class or interface as seen by the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    /// Fully qualified name.
    pub name: Name,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParamDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
}

impl TypeDeclaration {
    pub fn class(name: impl Into<Name>) -> Self {
        Self::new(name.into(), DeclKind::Class)
    }

    pub fn interface(name: impl Into<Name>) -> Self {
        Self::new(name.into(), DeclKind::Interface)
    }

    fn new(name: Name, kind: DeclKind) -> Self {
        Self {
            name,
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            operations: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParamDecl>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<TypeRef>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_operation(mut self, operation: OperationDecl) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorDecl) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub const fn is_class(&self) -> bool {
        matches!(self.kind, DeclKind::Class)
    }

    /// Reference to the type parameter `name` declared by this type.
    pub fn type_param_ref(&self, name: &str) -> Option<TypeRef> {
        self.type_params
            .iter()
            .find(|p| &*p.name == name)
            .map(|p| p.to_ref(&self.name))
    }

    /// Direct super-types: the superclass first, then interfaces in
    /// declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// All operations declared under `name`.
    pub fn operations_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a OperationDecl> + 'a {
        self.operations.iter().filter(move |op| &*op.name == name)
    }
}

// =============================================================================
// AncestorGraph
// =============================================================================

/// Read access to declarations and resolution of ancestor references.
pub trait AncestorGraph {
    fn declaration(&self, id: DeclId) -> Option<Arc<TypeDeclaration>>;

    /// Declaration denoted by a nominal reference. `None` for type
    /// parameters, arrays, and names the graph does not know.
    fn resolve_type(&self, ty: &TypeRef) -> Option<DeclId>;

    /// Exclusive upper bound of the ids this graph hands out.
    fn id_bound(&self) -> usize;
}

// =============================================================================
// DeclarationStore
// =============================================================================

/// Thread-safe registry of type declarations.
///
/// ```ignore
/// let store = DeclarationStore::new();
/// let id = store.register(TypeDeclaration::class("a.Agent"));
/// assert_eq!(store.id_of("a.Agent"), Some(id));
/// ```
pub struct DeclarationStore {
    instance_id: u64,
    declarations: DashMap<DeclId, Arc<TypeDeclaration>>,
    by_name: DashMap<Name, DeclId>,
    next_id: AtomicU32,
}

impl fmt::Debug for DeclarationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationStore")
            .field("instance_id", &self.instance_id)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for DeclarationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DeclarationStore::new");
        Self {
            instance_id,
            declarations: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicU32::new(DeclId::FIRST_VALID),
        }
    }

    /// Build a store from a list of declarations, in order.
    pub fn from_declarations(declarations: impl IntoIterator<Item = TypeDeclaration>) -> Self {
        let store = Self::new();
        for decl in declarations {
            store.register(decl);
        }
        store
    }

    fn allocate(&self) -> DeclId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        trace!(
            instance_id = self.instance_id,
            allocated_decl_id = id,
            "DeclarationStore::allocate"
        );
        DeclId(id)
    }

    /// Register a declaration and return its id.
    ///
    /// Registering a second declaration under an existing name makes the
    /// name resolve to the newer one.
    pub fn register(&self, decl: TypeDeclaration) -> DeclId {
        let id = self.allocate();
        trace!(
            instance_id = self.instance_id,
            decl_id = id.0,
            name = %decl.name,
            kind = ?decl.kind,
            "DeclarationStore::register"
        );
        if let Some(previous) = self.by_name.insert(decl.name.clone(), id) {
            warn!(
                name = %decl.name,
                previous = previous.0,
                replacement = id.0,
                "duplicate type declaration; name now resolves to the later one"
            );
        }
        self.declarations.insert(id, Arc::new(decl));
        id
    }

    pub fn get(&self, id: DeclId) -> Option<Arc<TypeDeclaration>> {
        self.declarations.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.declarations.contains_key(&id)
    }

    pub fn id_of(&self, name: &str) -> Option<DeclId> {
        self.by_name.get(name).map(|r| *r.value())
    }

    /// Look up a declaration by qualified name.
    pub fn lookup(&self, name: &str) -> Option<Arc<TypeDeclaration>> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// All ids in allocation order.
    pub fn all_ids(&self) -> Vec<DeclId> {
        let mut ids: Vec<DeclId> = self.declarations.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl AncestorGraph for DeclarationStore {
    fn declaration(&self, id: DeclId) -> Option<Arc<TypeDeclaration>> {
        self.get(id)
    }

    fn resolve_type(&self, ty: &TypeRef) -> Option<DeclId> {
        ty.declared_name().and_then(|name| self.id_of(name))
    }

    fn id_bound(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
