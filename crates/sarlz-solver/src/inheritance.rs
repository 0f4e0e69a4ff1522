//! Inheritance context resolution.
//!
//! Walks the ancestors of a type and reports, keyed by prototype:
//! - operations that are final (cannot be overridden),
//! - concrete operations that may be overridden,
//! - abstract operations nobody in the chain implements yet,
//! - inherited field names,
//! - constructors of the direct superclass that the type may mirror.
//!
//! The walk is breadth-first over ancestor edges, superclass before
//! interfaces, so the most-derived declaration of a prototype is seen first.
//! Every ancestor is expanded at most once (diamonds are visited once).
//!
//! Signatures cloned from generic ancestors go through the
//! [`TypeParameterMapping`] of the root, so prototypes are computed on the
//! substituted types.

use crate::def::{AncestorGraph, DeclId, OperationDecl, TypeDeclaration, TypeParamDecl};
use crate::instantiate::{FxIndexMap, TypeParameterMapping, build_mapping};
use crate::prototype::{ActionParameterTypes, ActionPrototype, Signature};
use crate::types::{Name, TypeRef, Visibility};
use fixedbitset::FixedBitSet;
use sarlz_common::diagnostics::{Diagnostic, diagnostic_codes};
use sarlz_common::limits;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, trace, warn};

/// Name under which constructors are reported.
pub const CONSTRUCTOR_NAME: &str = "new";

// =============================================================================
// Options
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Qualified names of ancestors that are neither walked nor descended.
    pub excluded_ancestors: BTreeSet<String>,
    /// Ignore compiler-generated operations of ancestors.
    pub skip_synthetic: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            excluded_ancestors: BTreeSet::new(),
            skip_synthetic: true,
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// An inherited operation, with its types substituted for the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    pub prototype: ActionPrototype,
    /// Qualified name of the declaring ancestor.
    pub owner: Name,
    #[serde(skip)]
    pub owner_id: DeclId,
    pub signature: Signature,
    pub return_type: TypeRef,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_final: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParamDecl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
}

impl OperationDescriptor {
    fn clone_from(
        decl: &TypeDeclaration,
        owner_id: DeclId,
        op: &OperationDecl,
        mapping: &TypeParameterMapping,
    ) -> Self {
        let signature = op.signature.map_types(|ty| mapping.substitute(ty));
        Self {
            prototype: ActionPrototype::from_signature(op.name.clone(), &signature),
            owner: decl.name.clone(),
            owner_id,
            signature,
            return_type: mapping.substitute(&op.return_type),
            visibility: op.visibility,
            is_abstract: op.is_abstract(),
            is_final: op.is_final(),
            type_parameters: op.type_params.clone(),
            exceptions: op.exceptions.iter().map(|ty| mapping.substitute(ty)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: Name,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub owner: Name,
}

/// A constructor of the direct superclass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorDescriptor {
    pub prototype: ActionPrototype,
    pub owner: Name,
    pub signature: Signature,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<TypeRef>,
}

/// An ancestor reference the graph could not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedAncestor {
    pub reference: TypeRef,
    /// Declaration whose super-type list mentions `reference`.
    pub referenced_by: Name,
}

impl UnresolvedAncestor {
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let reference = self.reference.to_string();
        Diagnostic::from_code(
            file.to_string(),
            0,
            0,
            diagnostic_codes::UNRESOLVED_ANCESTOR,
            &[reference.as_str(), &*self.referenced_by],
        )
    }
}

/// The walk stopped at [`limits::MAX_ANCESTOR_EDGES`] before the queue
/// was empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncatedWalk {
    pub root: Name,
    pub edge_limit: u32,
}

impl TruncatedWalk {
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let limit = self.edge_limit.to_string();
        Diagnostic::from_code(
            file.to_string(),
            0,
            0,
            diagnostic_codes::ANCESTOR_WALK_TRUNCATED,
            &[&*self.root, limit.as_str()],
        )
    }
}

/// Result of one resolution. Never cached.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceContext {
    /// Walked ancestors, in visitation order.
    pub ancestors: Vec<Name>,
    pub final_operations: BTreeMap<ActionPrototype, OperationDescriptor>,
    pub overridable_operations: BTreeMap<ActionPrototype, OperationDescriptor>,
    pub operations_to_implement: BTreeMap<ActionPrototype, OperationDescriptor>,
    pub inherited_fields: FxIndexMap<Name, FieldDescriptor>,
    pub constructors: BTreeMap<ActionParameterTypes, ConstructorDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedAncestor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<TruncatedWalk>,
}

impl InheritanceContext {
    /// `true` when every ancestor reference was resolved and walked.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.truncated.is_none()
    }

    pub fn is_final(&self, prototype: &ActionPrototype) -> bool {
        self.final_operations.contains_key(prototype)
    }

    pub fn must_implement(&self, prototype: &ActionPrototype) -> bool {
        self.operations_to_implement.contains_key(prototype)
    }

    pub fn diagnostics(&self, file: &str) -> Vec<Diagnostic> {
        self.unresolved
            .iter()
            .map(|u| u.to_diagnostic(file))
            .chain(self.truncated.iter().map(|t| t.to_diagnostic(file)))
            .collect()
    }

    fn record_operation(&mut self, op: OperationDescriptor) {
        let prototype = op.prototype.clone();
        if op.is_final {
            self.operations_to_implement.remove(&prototype);
            if !self.final_operations.contains_key(&prototype) {
                trace!(%prototype, owner = %op.owner, "final operation");
                self.final_operations.insert(prototype, op);
            }
        } else if self.final_operations.contains_key(&prototype) {
            trace!(%prototype, owner = %op.owner, "blocked by a final operation");
        } else if op.is_abstract {
            if !self.overridable_operations.contains_key(&prototype)
                && !self.operations_to_implement.contains_key(&prototype)
            {
                trace!(%prototype, owner = %op.owner, "operation to implement");
                self.operations_to_implement.insert(prototype, op);
            }
        } else {
            if self.operations_to_implement.remove(&prototype).is_some() {
                trace!(%prototype, owner = %op.owner, "implemented by a less-derived ancestor");
            }
            self.overridable_operations.entry(prototype).or_insert(op);
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

struct AncestorEdge {
    reference: TypeRef,
    referenced_by: Name,
    /// The root's own `extends` clause.
    direct_superclass: bool,
}

/// Computes [`InheritanceContext`]s over an [`AncestorGraph`].
pub struct InheritanceResolver<'g, G: AncestorGraph + ?Sized> {
    graph: &'g G,
    options: ResolverOptions,
}

impl<'g, G: AncestorGraph + ?Sized> InheritanceResolver<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve the context of `root`, additionally excluding `excluded`.
    #[tracing::instrument(level = "debug", skip_all, fields(root = root.0))]
    pub fn resolve<S: AsRef<str>>(&self, root: DeclId, excluded: &[S]) -> InheritanceContext {
        let mut context = InheritanceContext::default();
        let Some(root_decl) = self.graph.declaration(root) else {
            warn!(root = root.0, "no declaration registered for the resolution root");
            return context;
        };

        let is_excluded = |name: &str| {
            self.options.excluded_ancestors.contains(name)
                || excluded.iter().any(|e| e.as_ref() == name)
        };

        let mapping = build_mapping(self.graph, root);
        let mut visited = FixedBitSet::with_capacity(self.graph.id_bound().max(root.index() + 1));
        visited.insert(root.index());

        let mut queue: VecDeque<AncestorEdge> =
            VecDeque::with_capacity(limits::ANCESTOR_QUEUE_CAPACITY);
        enqueue_supertypes(&mut queue, &root_decl, root_decl.is_class());

        let mut edges: u32 = 0;
        while let Some(edge) = queue.pop_front() {
            edges += 1;
            if edges > limits::MAX_ANCESTOR_EDGES {
                warn!(
                    root = %root_decl.name,
                    limit = limits::MAX_ANCESTOR_EDGES,
                    "ancestor walk aborted; edge limit reached"
                );
                context.truncated = Some(TruncatedWalk {
                    root: root_decl.name.clone(),
                    edge_limit: limits::MAX_ANCESTOR_EDGES,
                });
                break;
            }

            if edge.reference.declared_name().is_some_and(&is_excluded) {
                trace!(ancestor = %edge.reference, "excluded");
                continue;
            }
            let Some(id) = self.graph.resolve_type(&edge.reference) else {
                record_unresolved(&mut context, edge);
                continue;
            };
            if id.index() >= visited.len() {
                visited.grow(id.index() + 1);
            }
            if visited.put(id.index()) {
                trace!(ancestor = %edge.reference, "already visited");
                continue;
            }
            let Some(decl) = self.graph.declaration(id) else {
                record_unresolved(&mut context, edge);
                continue;
            };
            debug!(ancestor = %decl.name, "visiting ancestor");
            context.ancestors.push(decl.name.clone());

            self.collect_members(&mut context, id, &decl, &mapping);
            if edge.direct_superclass && decl.is_class() {
                collect_constructors(&mut context, &decl, &mapping);
            }
            enqueue_supertypes(&mut queue, &decl, false);
        }

        debug!(
            final_operations = context.final_operations.len(),
            overridable_operations = context.overridable_operations.len(),
            operations_to_implement = context.operations_to_implement.len(),
            inherited_fields = context.inherited_fields.len(),
            constructors = context.constructors.len(),
            unresolved = context.unresolved.len(),
            "inheritance context resolved"
        );
        context
    }

    fn collect_members(
        &self,
        context: &mut InheritanceContext,
        id: DeclId,
        decl: &TypeDeclaration,
        mapping: &TypeParameterMapping,
    ) {
        for op in &decl.operations {
            if op.is_static() || !op.visibility.is_inheritable() {
                continue;
            }
            if op.is_synthetic() && self.options.skip_synthetic {
                trace!(operation = %op.name, owner = %decl.name, "synthetic operation skipped");
                continue;
            }
            context.record_operation(OperationDescriptor::clone_from(decl, id, op, mapping));
        }

        for field in &decl.fields {
            if !field.visibility.is_inheritable() {
                continue;
            }
            context
                .inherited_fields
                .entry(field.name.clone())
                .or_insert_with(|| FieldDescriptor {
                    name: field.name.clone(),
                    ty: mapping.substitute(&field.ty),
                    owner: decl.name.clone(),
                });
        }
    }
}

fn record_unresolved(context: &mut InheritanceContext, edge: AncestorEdge) {
    warn!(
        ancestor = %edge.reference,
        referenced_by = %edge.referenced_by,
        "unresolved ancestor; members inherited through it are ignored"
    );
    context.unresolved.push(UnresolvedAncestor {
        reference: edge.reference,
        referenced_by: edge.referenced_by,
    });
}

fn enqueue_supertypes(
    queue: &mut VecDeque<AncestorEdge>,
    decl: &TypeDeclaration,
    superclass_is_direct: bool,
) {
    if let Some(superclass) = &decl.superclass {
        queue.push_back(AncestorEdge {
            reference: superclass.clone(),
            referenced_by: decl.name.clone(),
            direct_superclass: superclass_is_direct,
        });
    }
    for interface in &decl.interfaces {
        queue.push_back(AncestorEdge {
            reference: interface.clone(),
            referenced_by: decl.name.clone(),
            direct_superclass: false,
        });
    }
}

fn collect_constructors(
    context: &mut InheritanceContext,
    decl: &TypeDeclaration,
    mapping: &TypeParameterMapping,
) {
    for ctor in &decl.constructors {
        if !ctor.visibility.is_inheritable() {
            continue;
        }
        let signature = ctor.signature.map_types(|ty| mapping.substitute(ty));
        let params = signature.parameter_types();
        context
            .constructors
            .entry(params.clone())
            .or_insert_with(|| ConstructorDescriptor {
                prototype: ActionPrototype::new(CONSTRUCTOR_NAME, params),
                owner: decl.name.clone(),
                signature,
                visibility: ctor.visibility,
                exceptions: ctor.exceptions.iter().map(|ty| mapping.substitute(ty)).collect(),
            });
    }
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
