//! End-to-end flows across the signature model, the resolver and the
//! synthesizer.

use crate::*;

/// A front-end declaration node seen through its formal-parameter view.
struct ActionNode {
    params: Vec<(&'static str, TypeRef, Option<Expr>, bool)>,
}

impl FormalParameterProvider for ActionNode {
    fn formal_parameter_count(&self) -> usize {
        self.params.len()
    }

    fn formal_parameter_name(&self, position: usize) -> Name {
        self.params[position].0.into()
    }

    fn formal_parameter_type(&self, position: usize) -> TypeRef {
        self.params[position].1.clone()
    }

    fn has_formal_parameter_default_value(&self, position: usize) -> bool {
        self.params[position].2.is_some()
    }

    fn formal_parameter_default_value(&self, position: usize) -> Option<Expr> {
        self.params[position].2.clone()
    }

    fn is_formal_parameter_varargs(&self, position: usize) -> bool {
        self.params[position].3
    }
}

fn influence_node() -> ActionNode {
    ActionNode {
        params: vec![
            (
                "linearInfluence",
                TypeRef::named("java.lang.String"),
                Some(Expr::literal(Literal::Null)),
                false,
            ),
            (
                "angularInfluence",
                TypeRef::named("float"),
                Some(Expr::source("0f")),
                false,
            ),
            ("otherInfluences", TypeRef::object(), None, true),
        ],
    }
}

/// Declares the canonical action and its synthesized overloads on `owner`,
/// the way the emitter does.
fn declare_with_overloads(owner: &str, action: &str, signature: Signature) -> TypeDeclaration {
    let set = OverloadSynthesizer::new()
        .synthesize_action(owner, action, &signature, ())
        .expect("no collision");
    let mut decl = TypeDeclaration::class(owner).with_operation(
        OperationDecl::new(action, signature).with_flags(OperationFlags::ABSTRACT),
    );
    for overload in set.overloads {
        decl = decl.with_operation(
            OperationDecl::new(action, overload.signature).with_flags(OperationFlags::SYNTHETIC),
        );
    }
    decl
}

#[test]
fn test_provider_to_overloads() {
    let signature = Signature::from_provider(&influence_node()).expect("valid");
    let set = OverloadSynthesizer::new()
        .synthesize(&signature, ())
        .expect("no collision");

    let prototypes: Vec<String> = set
        .prototypes("influenceKinematic")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        prototypes,
        [
            "influenceKinematic(java.lang.String,float,java.lang.Object*)",
            "influenceKinematic(java.lang.Object*)",
            "influenceKinematic(float,java.lang.Object*)",
            "influenceKinematic(java.lang.String,java.lang.Object*)",
        ]
    );
}

#[test]
fn test_provider_rejects_defaulted_varargs() {
    let mut node = influence_node();
    node.params[2].2 = Some(Expr::literal(Literal::Null));
    assert!(matches!(
        Signature::from_provider(&node),
        Err(InvalidSignatureError::VarargsWithDefault { position: 2, .. })
    ));
}

#[test]
fn test_synthetic_overloads_are_not_inherited() {
    let signature = Signature::from_provider(&influence_node()).expect("valid");
    let store = DeclarationStore::new();
    store.register(declare_with_overloads(
        "io.sarl.PhysicEnvironment",
        "influenceKinematic",
        signature,
    ));
    let root = store.register(
        TypeDeclaration::class("io.sarl.MyEnvironment")
            .with_superclass(TypeRef::named("io.sarl.PhysicEnvironment")),
    );

    let context = InheritanceResolver::new(&store).resolve(root, &[] as &[&str]);
    let to_implement: Vec<String> = context
        .operations_to_implement
        .keys()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        to_implement,
        ["influenceKinematic(java.lang.String,float,java.lang.Object*)"]
    );
}

#[test]
fn test_generic_action_with_defaults_through_inheritance() {
    let store = DeclarationStore::new();
    let put = Signature::new([
        ParameterSpec::new("key", TypeRef::param("a.Store", "K")),
        ParameterSpec::new("value", TypeRef::param("a.Store", "V")).with_default_flag(),
    ])
    .expect("valid");
    store.register(
        TypeDeclaration::interface("a.Store")
            .with_type_params(vec![TypeParamDecl::new("K"), TypeParamDecl::new("V")])
            .with_operation(OperationDecl::new("put", put).with_flags(OperationFlags::ABSTRACT)),
    );
    let root = store.register(TypeDeclaration::class("a.Names").with_interfaces(vec![
        TypeRef::generic(
            "a.Store",
            vec![TypeRef::named("int"), TypeRef::named("java.lang.String")],
        ),
    ]));

    let context = InheritanceResolver::new(&store).resolve(root, &[] as &[&str]);
    let (prototype, descriptor) = context
        .operations_to_implement
        .iter()
        .next()
        .expect("one abstract operation");
    assert_eq!(prototype.to_string(), "put(int,java.lang.String)");

    // The inherited signature keeps its defaults, so the subtype can
    // synthesize the same overloads on the substituted types.
    let set = OverloadSynthesizer::new()
        .synthesize(&descriptor.signature, ())
        .expect("no collision");
    assert_eq!(set.len(), 1);
    assert_eq!(set.overloads[0].parameter_types.to_string(), "int");
    assert_eq!(set.overloads[0].plan.to_string(), "(key, null)");
}

#[test]
fn test_model_round_trips_through_json() {
    let decl = declare_with_overloads(
        "io.sarl.PhysicEnvironment",
        "influenceKinematic",
        Signature::from_provider(&influence_node()).expect("valid"),
    );
    let json = serde_json::to_string(&decl).expect("serializable");
    let back: TypeDeclaration = serde_json::from_str(&json).expect("deserializable");
    assert_eq!(back, decl);
}
