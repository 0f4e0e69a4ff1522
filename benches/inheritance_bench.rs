//! Inheritance resolution benchmark
//!
//! Resolves roots of deep superclass chains and wide interface fans over a
//! generic base.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sarlz::solver::def::{OperationDecl, OperationFlags, TypeParamDecl};
use sarlz::solver::prototype::ParameterSpec;
use sarlz::solver::types::TypeRef;
use sarlz::{DeclId, DeclarationStore, InheritanceResolver, Signature, TypeDeclaration};

fn operation(name: String, ty: TypeRef) -> OperationDecl {
    match Signature::new([ParameterSpec::new("value", ty)]) {
        Ok(signature) => OperationDecl::new(name, signature),
        Err(err) => panic!("benchmark signature is invalid: {err}"),
    }
}

/// `bench.C0 <- bench.C1 <- ... <- bench.C{depth}`, every class adding two
/// actions over the generic parameter of `bench.Base<T>`.
fn chain(depth: usize) -> (DeclarationStore, DeclId) {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::class("bench.Base")
            .with_type_params(vec![TypeParamDecl::new("T")])
            .with_operation(
                operation("accept".to_string(), TypeRef::param("bench.Base", "T"))
                    .with_flags(OperationFlags::ABSTRACT),
            ),
    );
    let mut root = store.register(
        TypeDeclaration::class("bench.C0")
            .with_superclass(TypeRef::generic("bench.Base", vec![TypeRef::named("java.lang.String")])),
    );
    for level in 1..=depth {
        root = store.register(
            TypeDeclaration::class(format!("bench.C{level}"))
                .with_superclass(TypeRef::named(format!("bench.C{}", level - 1)))
                .with_operation(operation(format!("op{level}"), TypeRef::named("int")))
                .with_operation(
                    operation(format!("fixed{level}"), TypeRef::named("long"))
                        .with_flags(OperationFlags::FINAL),
                ),
        );
    }
    (store, root)
}

/// One class implementing `width` interfaces that all extend `bench.Shared`.
fn fan(width: usize) -> (DeclarationStore, DeclId) {
    let store = DeclarationStore::new();
    store.register(
        TypeDeclaration::interface("bench.Shared").with_operation(
            operation("shared".to_string(), TypeRef::named("int"))
                .with_flags(OperationFlags::ABSTRACT),
        ),
    );
    let interfaces = (0..width)
        .map(|i| {
            store.register(
                TypeDeclaration::interface(format!("bench.I{i}"))
                    .with_interfaces(vec![TypeRef::named("bench.Shared")])
                    .with_operation(
                        operation(format!("i{i}"), TypeRef::named("double"))
                            .with_flags(OperationFlags::ABSTRACT),
                    ),
            );
            TypeRef::named(format!("bench.I{i}"))
        })
        .collect();
    let root = store.register(TypeDeclaration::class("bench.Root").with_interfaces(interfaces));
    (store, root)
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("inheritance_chain");
    for depth in [8usize, 64, 256] {
        let (store, root) = chain(depth);
        let resolver = InheritanceResolver::new(&store);
        group.bench_with_input(BenchmarkId::new("depth", depth), &root, |b, &root| {
            b.iter(|| black_box(resolver.resolve(root, &[] as &[&str]).overridable_operations.len()));
        });
    }
    group.finish();
}

fn bench_interface_fan(c: &mut Criterion) {
    let mut group = c.benchmark_group("inheritance_fan");
    for width in [4usize, 32, 128] {
        let (store, root) = fan(width);
        let resolver = InheritanceResolver::new(&store);
        group.bench_with_input(BenchmarkId::new("width", width), &root, |b, &root| {
            b.iter(|| black_box(resolver.resolve(root, &[] as &[&str]).operations_to_implement.len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_deep_chain, bench_interface_fan);
criterion_main!(benches);
