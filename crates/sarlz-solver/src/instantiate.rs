//! Type-parameter substitution along an ancestor chain.
//!
//! When the resolver clones an operation declared on a generic ancestor, the
//! ancestor's type parameters must be replaced by the arguments the subtype
//! supplied at its extension point:
//!
//! ```text
//! class Base<T>            { def get : T }
//! class Mid<U> extends Base<U[]>
//! class Leaf  extends Mid<String>
//! ```
//!
//! For `Leaf`, `Base$T -> U[]` and `Mid$U -> String`, so `get` returns
//! `String[]` once substituted deeply.

use crate::def::{AncestorGraph, DeclId};
use crate::types::{TypeParamKey, TypeRef, well_known};
use fixedbitset::FixedBitSet;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use sarlz_common::limits;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// `owner$param -> type argument`, in discovery order.
///
/// Built once per resolution and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct TypeParameterMapping {
    entries: FxIndexMap<TypeParamKey, TypeRef>,
}

impl TypeParameterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. The first binding of a key wins, so the extension
    /// point closest to the root takes precedence.
    pub fn insert(&mut self, key: TypeParamKey, ty: TypeRef) -> bool {
        if self.entries.contains_key(&key) {
            trace!(%key, "type parameter already bound");
            return false;
        }
        debug!(%key, ty = %ty, "type parameter binding");
        self.entries.insert(key, ty);
        true
    }

    pub fn get(&self, key: &TypeParamKey) -> Option<&TypeRef> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeParamKey, &TypeRef)> {
        self.entries.iter()
    }

    /// Follow a type parameter through the mapping.
    ///
    /// The chase stops at the first value that is not itself a mapped type
    /// parameter. It takes at most `len()` steps; a cyclic mapping yields the
    /// last value reached. Types that are not type parameters, and unmapped
    /// parameters, are returned unchanged.
    pub fn resolve<'a>(&'a self, ty: &'a TypeRef) -> &'a TypeRef {
        let Some(key) = ty.param_key() else {
            return ty;
        };
        let Some(mut current) = self.entries.get(&key) else {
            return ty;
        };
        for _ in 0..self.entries.len() {
            let next = current.param_key().and_then(|k| self.entries.get(&k));
            match next {
                Some(next) => current = next,
                None => return current,
            }
        }
        warn!(
            start = %key,
            last = %current,
            bound = self.entries.len(),
            "type parameter mapping is cyclic; using the last value found"
        );
        current
    }

    /// Apply [`resolve`](Self::resolve) through array elements and generic
    /// arguments.
    pub fn substitute(&self, ty: &TypeRef) -> TypeRef {
        self.substitute_bounded(ty, self.entries.len() + 1)
    }

    fn substitute_bounded(&self, ty: &TypeRef, depth: usize) -> TypeRef {
        if depth == 0 {
            return ty.clone();
        }
        match ty {
            TypeRef::Named { .. } => ty.clone(),
            TypeRef::Param { .. } => {
                let resolved = self.resolve(ty);
                if resolved == ty {
                    ty.clone()
                } else {
                    // The argument may mention parameters of another ancestor.
                    self.substitute_bounded(resolved, depth - 1)
                }
            }
            TypeRef::Array { element } => TypeRef::array(self.substitute_bounded(element, depth)),
            TypeRef::Generic { base, args } => TypeRef::Generic {
                base: base.clone(),
                args: args
                    .iter()
                    .map(|arg| self.substitute_bounded(arg, depth))
                    .collect(),
            },
        }
    }
}

/// Build the mapping for `root` by walking every resolvable super-type
/// breadth-first.
///
/// Each declaration is expanded once, and at most
/// [`limits::MAX_ANCESTOR_EDGES`] declarations are taken off the queue.
/// `java.lang.Object` contributes no
/// entries and is not expanded. Extension points without type arguments
/// (raw or non-generic references) are walked through but bind nothing.
#[tracing::instrument(level = "debug", skip_all, fields(root = root.0))]
pub fn build_mapping<G: AncestorGraph + ?Sized>(graph: &G, root: DeclId) -> TypeParameterMapping {
    let mut mapping = TypeParameterMapping::new();
    let mut expanded = FixedBitSet::with_capacity(graph.id_bound().max(root.index() + 1));
    let mut queue = VecDeque::from([root]);

    let mut edges: u32 = 0;
    while let Some(id) = queue.pop_front() {
        edges += 1;
        if edges > limits::MAX_ANCESTOR_EDGES {
            warn!(
                root = root.0,
                limit = limits::MAX_ANCESTOR_EDGES,
                "type parameter mapping stopped; edge limit reached"
            );
            break;
        }
        if expanded.contains(id.index()) {
            continue;
        }
        expanded.insert(id.index());
        let Some(decl) = graph.declaration(id) else {
            continue;
        };

        for super_ref in decl.supertypes() {
            if super_ref.declared_name() == Some(well_known::OBJECT) {
                continue;
            }
            let Some(super_id) = graph.resolve_type(super_ref) else {
                trace!(super_type = %super_ref, "unresolved super-type skipped");
                continue;
            };
            if let TypeRef::Generic { args, .. } = super_ref {
                if let Some(super_decl) = graph.declaration(super_id) {
                    for (param, arg) in super_decl.type_params.iter().zip(args) {
                        mapping.insert(
                            TypeParamKey::new(super_decl.name.clone(), param.name.clone()),
                            arg.clone(),
                        );
                    }
                }
            }
            if super_id.index() >= expanded.len() {
                expanded.grow(super_id.index() + 1);
            }
            queue.push_back(super_id);
        }
    }

    mapping
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
