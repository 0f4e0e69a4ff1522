//! sarlz: action-signature resolution and default-value overload synthesis.
//!
//! This crate is the facade over the workspace:
//! - [`common`]: diagnostics and limits shared by every crate
//! - [`solver`]: signature identity, inheritance resolution, overload synthesis
//! - [`cli`]: the `sarlz` batch driver
//!
//! The most used solver types are re-exported at the crate root.

pub use sarlz_common as common;
pub use sarlz_solver as solver;

pub use sarlz_common::{Diagnostic, DiagnosticCategory, format_message};
pub use sarlz_solver::{
    ActionParameterTypes, ActionPrototype, AncestorGraph, DeclId, DeclarationStore,
    FormalParameterProvider, InheritanceContext, InheritanceResolver, OverloadSet,
    OverloadSynthesizer, ParameterSpec, ResolverOptions, Signature, SynthesisError,
    SynthesisOptions, TypeDeclaration, TypeRef,
};

// Centralized limits
pub use sarlz_common::limits;

pub mod tracing_config;

pub mod cli;
