//! Action-signature solver
//!
//! Computes the identity of action signatures, resolves what a type inherits
//! from its ancestors, and synthesizes the overloads implied by default-valued
//! parameters.
//!
//! - [`types`]: type references and erasure
//! - [`prototype`]: signatures, parameter-type lists and prototypes
//! - [`defaults`]: canonical default expression per type
//! - [`def`]: type declarations and the declaration store
//! - [`instantiate`]: type-parameter substitution along ancestor chains
//! - [`inheritance`]: final / overridable / to-implement operations, fields,
//!   mirrored constructors
//! - [`overloads`]: default-value overload synthesis
//!
//! Every entry point is synchronous and side-effect free; results are fresh
//! per call and never cached.
pub mod def;
pub mod defaults;
pub mod inheritance;
pub mod instantiate;
pub mod overloads;
pub mod prototype;
pub mod types;

pub use def::{
    AncestorGraph, ConstructorDecl, DeclId, DeclKind, DeclarationStore, FieldDecl, OperationDecl,
    OperationFlags, TypeDeclaration, TypeParamDecl,
};
pub use defaults::{DefaultExpression, default_expression_for, default_expression_for_name};
pub use inheritance::{
    ConstructorDescriptor, FieldDescriptor, InheritanceContext, InheritanceResolver,
    OperationDescriptor, ResolverOptions, TruncatedWalk, UnresolvedAncestor,
};
pub use instantiate::{TypeParameterMapping, build_mapping};
pub use overloads::{
    Argument, ArgumentPlan, DuplicateOverloadError, OmittedSet, Overload, OverloadSet,
    OverloadSynthesizer, SynthesisError, SynthesisOptions,
};
pub use prototype::{
    ActionParameterTypes, ActionPrototype, DefaultValueId, FormalParameterProvider,
    InvalidSignatureError, ParameterSpec, ParsePrototypeError, Signature,
};
pub use types::{ErasedType, Expr, Literal, Name, PrimitiveKind, TypeParamKey, TypeRef, Visibility};

// Test modules: most are loaded by their source files via #[path = "../tests/..."].
#[cfg(test)]
#[path = "../tests/integration_tests.rs"]
mod integration_tests;

#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
