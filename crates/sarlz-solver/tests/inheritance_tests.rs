use super::*;
use crate::def::{ConstructorDecl, DeclarationStore, FieldDecl, OperationFlags, TypeParamDecl};
use crate::prototype::ParameterSpec;
use crate::types::well_known;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

const NO_EXCLUSIONS: &[&str] = &[];

fn sig(types: &[&str]) -> Signature {
    Signature::new(
        types
            .iter()
            .enumerate()
            .map(|(i, ty)| ParameterSpec::new(format!("p{i}"), TypeRef::named(*ty))),
    )
    .expect("valid signature")
}

fn op(name: &str, types: &[&str]) -> OperationDecl {
    OperationDecl::new(name, sig(types))
}

fn abstract_op(name: &str, types: &[&str]) -> OperationDecl {
    op(name, types).with_flags(OperationFlags::ABSTRACT)
}

fn proto(text: &str) -> ActionPrototype {
    text.parse().expect("valid prototype")
}

fn names(names: &[Name]) -> Vec<&str> {
    names.iter().map(|n| &**n).collect()
}

fn resolve(store: &DeclarationStore, root: DeclId) -> InheritanceContext {
    InheritanceResolver::new(store).resolve(root, NO_EXCLUSIONS)
}

#[test]
fn test_walk_is_breadth_first_superclass_first() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::interface("a.I0"));
    store.register(
        TypeDeclaration::interface("a.I1").with_interfaces(vec![TypeRef::named("a.I0")]),
    );
    store.register(TypeDeclaration::interface("a.I2"));
    store.register(TypeDeclaration::class("a.B").with_interfaces(vec![TypeRef::named("a.I1")]));
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::named("a.B"))
            .with_interfaces(vec![TypeRef::named("a.I1"), TypeRef::named("a.I2")]),
    );

    let context = resolve(&store, root);
    assert_eq!(names(&context.ancestors), ["a.B", "a.I1", "a.I2", "a.I0"]);
    assert!(context.is_complete());
}

#[test]
fn test_diamond_ancestor_is_visited_once() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::interface("a.Top")
            .with_operation(abstract_op("run", &["int"]))
            .with_field(FieldDecl::new("LIMIT", TypeRef::named("int"))),
    );
    store.register(
        TypeDeclaration::interface("a.Left").with_interfaces(vec![TypeRef::named("a.Top")]),
    );
    store.register(
        TypeDeclaration::interface("a.Right").with_interfaces(vec![TypeRef::named("a.Top")]),
    );
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_interfaces(vec![TypeRef::named("a.Left"), TypeRef::named("a.Right")]),
    );

    let context = resolve(&store, root);
    assert_eq!(names(&context.ancestors), ["a.Left", "a.Right", "a.Top"]);
    assert_eq!(context.operations_to_implement.len(), 1);
    assert_eq!(context.inherited_fields.len(), 1);
}

#[test]
fn test_concrete_anywhere_in_the_chain_implements_abstract() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::class("a.C").with_operation(op("stop", &[])));
    store.register(
        TypeDeclaration::class("a.B")
            .with_superclass(TypeRef::named("a.C"))
            .with_operation(abstract_op("stop", &[]))
            .with_operation(abstract_op("start", &["int"])),
    );
    store.register(
        TypeDeclaration::interface("a.I")
            .with_operation(abstract_op("run", &["int"]))
            .with_operation(abstract_op("start", &["int"])),
    );
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::named("a.B"))
            .with_interfaces(vec![TypeRef::named("a.I")]),
    );

    let context = resolve(&store, root);
    assert!(context.must_implement(&proto("run(int)")));
    assert!(context.must_implement(&proto("start(int)")));
    assert!(!context.must_implement(&proto("stop()")));
    assert_eq!(context.overridable_operations[&proto("stop()")].owner.as_ref(), "a.C");
}

#[test]
fn test_concrete_recorded_first_blocks_abstract() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::interface("a.I").with_operation(abstract_op("run", &["int"])));
    store.register(TypeDeclaration::class("a.B").with_operation(op("run", &["int"])));
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::named("a.B"))
            .with_interfaces(vec![TypeRef::named("a.I")]),
    );

    let context = resolve(&store, root);
    assert!(context.operations_to_implement.is_empty());
    assert!(context.overridable_operations.contains_key(&proto("run(int)")));
}

#[test]
fn test_final_blocks_less_derived_declarations() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("a.C")
            .with_operation(op("id", &[]))
            .with_operation(abstract_op("name", &[])),
    );
    store.register(
        TypeDeclaration::class("a.B")
            .with_superclass(TypeRef::named("a.C"))
            .with_operation(op("id", &[]).with_flags(OperationFlags::FINAL)),
    );
    let root = store.register(TypeDeclaration::class("a.Root").with_superclass(TypeRef::named("a.B")));

    let context = resolve(&store, root);
    assert!(context.is_final(&proto("id()")));
    assert!(!context.overridable_operations.contains_key(&proto("id()")));
    assert!(context.must_implement(&proto("name()")));
}

#[test]
fn test_final_removes_pending_abstract() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::class("a.C").with_operation(op("name", &[]).with_flags(OperationFlags::FINAL)));
    store.register(TypeDeclaration::class("a.B").with_superclass(TypeRef::named("a.C")));
    store.register(TypeDeclaration::interface("a.I").with_operation(abstract_op("name", &[])));
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::named("a.B"))
            .with_interfaces(vec![TypeRef::named("a.I")]),
    );

    let context = resolve(&store, root);
    assert_eq!(names(&context.ancestors), ["a.B", "a.I", "a.C"]);
    assert!(context.is_final(&proto("name()")));
    assert!(!context.must_implement(&proto("name()")));
}

#[test]
fn test_constructors_come_from_the_direct_superclass_only() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::class("a.C").with_constructor(ConstructorDecl::new(sig(&["double"]))));
    store.register(
        TypeDeclaration::class("a.B")
            .with_superclass(TypeRef::named("a.C"))
            .with_constructor(ConstructorDecl::new(sig(&[])))
            .with_constructor(ConstructorDecl::new(sig(&["int"])))
            .with_constructor(
                ConstructorDecl::new(sig(&[well_known::STRING])).with_visibility(Visibility::Private),
            ),
    );
    let root = store.register(TypeDeclaration::class("a.Root").with_superclass(TypeRef::named("a.B")));

    let context = resolve(&store, root);
    let keys: Vec<String> = context.constructors.keys().map(ToString::to_string).collect();
    assert_eq!(keys, ["", "int"]);
    let int_ctor = &context.constructors[&"int".parse::<ActionParameterTypes>().expect("valid")];
    assert_eq!(int_ctor.prototype.to_string(), "new(int)");
    assert_eq!(int_ctor.owner.as_ref(), "a.B");
}

#[test]
fn test_interface_root_mirrors_no_constructors() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::interface("a.I").with_constructor(ConstructorDecl::new(sig(&[]))));
    let root = store.register(TypeDeclaration::interface("a.J").with_interfaces(vec![TypeRef::named("a.I")]));

    assert!(resolve(&store, root).constructors.is_empty());
}

#[test]
fn test_non_inheritable_operations_are_ignored() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("a.B")
            .with_operation(op("helper", &[]).with_visibility(Visibility::Private))
            .with_operation(op("create", &[]).with_flags(OperationFlags::STATIC))
            .with_operation(op("emit", &[]).with_flags(OperationFlags::SYNTHETIC))
            .with_operation(op("emit", &["int"])),
    );
    let root = store.register(TypeDeclaration::class("a.Root").with_superclass(TypeRef::named("a.B")));

    let context = resolve(&store, root);
    let keys: Vec<String> = context
        .overridable_operations
        .keys()
        .map(ToString::to_string)
        .collect();
    assert_eq!(keys, ["emit(int)"]);

    let with_synthetic = InheritanceResolver::new(&store)
        .with_options(ResolverOptions {
            skip_synthetic: false,
            ..ResolverOptions::default()
        })
        .resolve(root, NO_EXCLUSIONS);
    assert!(with_synthetic.overridable_operations.contains_key(&proto("emit()")));
}

#[test]
fn test_generic_ancestor_signatures_are_substituted() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("a.Box")
            .with_type_params(vec![TypeParamDecl::new("T")])
            .with_operation(
                OperationDecl::new(
                    "put",
                    Signature::new([ParameterSpec::new("value", TypeRef::param("a.Box", "T"))])
                        .expect("valid"),
                ),
            )
            .with_operation(
                op("get", &[]).returning(TypeRef::generic(
                    "java.util.List",
                    vec![TypeRef::param("a.Box", "T")],
                )),
            )
            .with_field(FieldDecl::new("content", TypeRef::param("a.Box", "T"))),
    );
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::generic("a.Box", vec![TypeRef::named(well_known::STRING)])),
    );

    let context = resolve(&store, root);
    assert!(context.overridable_operations.contains_key(&proto("put(java.lang.String)")));
    assert!(!context.overridable_operations.contains_key(&proto("put(java.lang.Object)")));
    assert_eq!(
        context.overridable_operations[&proto("get()")].return_type,
        TypeRef::generic("java.util.List", vec![TypeRef::named(well_known::STRING)])
    );
    assert_eq!(
        context.inherited_fields["content"].ty,
        TypeRef::named(well_known::STRING)
    );
}

#[test]
fn test_unresolved_ancestor_yields_partial_context() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::interface("a.I").with_operation(abstract_op("run", &[])));
    let root = store.register(
        TypeDeclaration::class("a.Root")
            .with_superclass(TypeRef::named("a.Missing"))
            .with_interfaces(vec![TypeRef::named("a.I")]),
    );

    let context = resolve(&store, root);
    assert!(!context.is_complete());
    assert_eq!(context.unresolved.len(), 1);
    assert_eq!(context.unresolved[0].reference, TypeRef::named("a.Missing"));
    assert_eq!(context.unresolved[0].referenced_by.as_ref(), "a.Root");
    assert!(context.must_implement(&proto("run()")));

    let diagnostics = context.diagnostics("Root.sarl");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::UNRESOLVED_ANCESTOR);
    assert!(!diagnostics[0].is_error());
    assert!(diagnostics[0].message_text.contains("a.Missing"));
}

#[test]
fn test_excluded_ancestors_are_not_descended() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::class(well_known::OBJECT).with_operation(op("toString", &[])));
    store.register(
        TypeDeclaration::class("a.B")
            .with_superclass(TypeRef::object())
            .with_operation(op("run", &[])),
    );
    let root = store.register(TypeDeclaration::class("a.Root").with_superclass(TypeRef::named("a.B")));

    let all = resolve(&store, root);
    assert!(all.overridable_operations.contains_key(&proto("toString()")));

    let without_object = InheritanceResolver::new(&store)
        .with_options(ResolverOptions {
            excluded_ancestors: [well_known::OBJECT.to_string()].into(),
            ..ResolverOptions::default()
        })
        .resolve(root, NO_EXCLUSIONS);
    assert!(!without_object.overridable_operations.contains_key(&proto("toString()")));

    let without_b = InheritanceResolver::new(&store).resolve(root, &["a.B"]);
    assert!(without_b.ancestors.is_empty());
    assert!(without_b.overridable_operations.is_empty());
}

#[test]
fn test_fields_first_writer_wins_and_private_skipped() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("a.C")
            .with_field(FieldDecl::new("name", TypeRef::named(well_known::STRING)))
            .with_field(FieldDecl::new("secret", TypeRef::named("int")).with_visibility(Visibility::Private)),
    );
    store.register(
        TypeDeclaration::class("a.B")
            .with_superclass(TypeRef::named("a.C"))
            .with_field(FieldDecl::new("name", TypeRef::object())),
    );
    let root = store.register(TypeDeclaration::class("a.Root").with_superclass(TypeRef::named("a.B")));

    let context = resolve(&store, root);
    assert_eq!(context.inherited_fields.len(), 1);
    assert_eq!(context.inherited_fields["name"].owner.as_ref(), "a.B");
}

#[test]
fn test_unknown_root_gives_empty_context() {
    let store = DeclarationStore::new();
    let context = resolve(&store, DeclId(42));
    assert!(context.ancestors.is_empty());
    assert!(context.is_complete());
}

#[test]
fn test_context_serializes_prototypes_as_keys() {
    let store = DeclarationStore::new();
    store.register(TypeDeclaration::interface("a.I").with_operation(abstract_op("run", &["int"])));
    let root = store.register(
        TypeDeclaration::class("a.Root").with_interfaces(vec![TypeRef::named("a.I")]),
    );

    let json = serde_json::to_value(resolve(&store, root)).expect("serializable");
    assert!(json["operationsToImplement"]["run(int)"].is_object());
    assert_eq!(json["operationsToImplement"]["run(int)"]["owner"], "a.I");
}

#[test]
fn test_cyclic_hierarchy_terminates() {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("a.A")
            .with_type_params(vec![TypeParamDecl::new("T")])
            .with_superclass(TypeRef::generic("a.B", vec![TypeRef::param("a.A", "T")])),
    );
    store.register(
        TypeDeclaration::class("a.B")
            .with_type_params(vec![TypeParamDecl::new("U")])
            .with_superclass(TypeRef::named("a.A"))
            .with_operation(op("run", &[])),
    );
    let root = store.register(
        TypeDeclaration::class("a.C")
            .with_superclass(TypeRef::generic("a.A", vec![TypeRef::named(well_known::STRING)])),
    );

    let context = resolve(&store, root);
    assert_eq!(names(&context.ancestors), vec!["a.A", "a.B"]);
    assert_eq!(context.overridable_operations.len(), 1);
    assert!(context.overridable_operations.contains_key(&proto("run()")));
    assert!(context.is_complete());

    let a = store.id_of("a.A").expect("registered");
    let context = resolve(&store, a);
    assert_eq!(names(&context.ancestors), vec!["a.B"]);
}

/// Every super-type reference resolves to a declaration never seen before.
struct EndlessGraph {
    next: AtomicU32,
}

impl AncestorGraph for EndlessGraph {
    fn declaration(&self, id: DeclId) -> Option<Arc<TypeDeclaration>> {
        let decl = TypeDeclaration::class(format!("a.Level{}", id.0))
            .with_superclass(TypeRef::named("a.Next"));
        Some(Arc::new(decl))
    }

    fn resolve_type(&self, _ty: &TypeRef) -> Option<DeclId> {
        Some(DeclId(self.next.fetch_add(1, Ordering::Relaxed)))
    }

    fn id_bound(&self) -> usize {
        4
    }
}

#[test]
fn test_endless_hierarchy_is_truncated() {
    let graph = EndlessGraph {
        next: AtomicU32::new(2),
    };
    let context = InheritanceResolver::new(&graph).resolve(DeclId(1), NO_EXCLUSIONS);

    assert_eq!(context.ancestors.len(), limits::MAX_ANCESTOR_EDGES as usize);
    assert!(context.unresolved.is_empty());
    assert!(!context.is_complete());
    let truncated = context.truncated.as_ref().expect("walk was truncated");
    assert_eq!(truncated.root.as_ref(), "a.Level1");
    assert_eq!(truncated.edge_limit, limits::MAX_ANCESTOR_EDGES);

    let diagnostics = context.diagnostics("model.json");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::ANCESTOR_WALK_TRUNCATED);
    assert!(!diagnostics[0].is_error());
    assert!(diagnostics[0].message_text.contains("'a.Level1'"));

    let json = serde_json::to_value(&context).expect("serializable");
    assert_eq!(json["truncated"]["edgeLimit"], limits::MAX_ANCESTOR_EDGES);
}

#[test]
fn test_complete_walk_omits_truncation() {
    let store = DeclarationStore::new();
    let root = store.register(TypeDeclaration::class("a.Root"));
    let context = resolve(&store, root);
    assert!(context.truncated.is_none());
    let json = serde_json::to_value(&context).expect("serializable");
    assert!(json.get("truncated").is_none());
}
