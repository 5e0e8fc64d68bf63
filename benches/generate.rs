//! Generation throughput: registry → plans → C++ text for both backends.
//!
//! Measures the built-in registry and a synthetic 256-type registry, whose
//! CUDA file carries 256 × 256 table slots per direction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use copygen::audit::audit;
use copygen::dispatch::{plan_backend, plan_registry};
use copygen::emit::{render_backend, EmitOptions};
use copygen::registry::{builtin, Backend, Device, Registry, ScalarKind, TypeDescriptor};

/// Build a registry of `n` uniquely named types cycling through backends
/// and scalar kinds.
fn synthetic_registry(n: u32) -> Registry {
    let mut types = Vec::with_capacity(n as usize);
    for i in 0..n {
        let backend = Backend::ALL[(i as usize / ScalarKind::ALL.len()) % Backend::ALL.len()];
        let scalar = ScalarKind::ALL[i as usize % ScalarKind::ALL.len()];
        let mut t = TypeDescriptor::new(backend, scalar, i);
        t.name = format!("{}{}", t.name, i);
        t.tensor = format!("{}{}", t.tensor, i);
        types.push(t);
    }
    Registry::new(types).expect("synthetic registry is valid")
}

fn bench_plan(c: &mut Criterion) {
    let builtin = builtin();
    let large = synthetic_registry(256);

    let mut group = c.benchmark_group("plan");
    group.bench_function("builtin_30", |b| {
        b.iter(|| plan_registry(black_box(&builtin)).unwrap())
    });
    group.bench_function("synthetic_256", |b| {
        b.iter(|| plan_registry(black_box(&large)).unwrap())
    });
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let builtin = builtin();
    let large = synthetic_registry(256);
    let options = EmitOptions::default();

    let mut group = c.benchmark_group("generate");
    for (label, registry) in [("builtin_30", &builtin), ("synthetic_256", &large)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                for device in Device::ALL {
                    let plan = plan_backend(black_box(registry), device).unwrap();
                    black_box(render_backend(&plan, &options));
                }
            })
        });
    }
    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let builtin = builtin();
    let plans = plan_registry(&builtin).unwrap();
    c.bench_function("audit_builtin_30", |b| {
        b.iter(|| audit(black_box(&builtin), &plans))
    });
}

criterion_group!(benches, bench_plan, bench_generate, bench_audit);
criterion_main!(benches);
