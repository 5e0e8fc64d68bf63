use std::path::Path;

use copygen::audit::audit;
use copygen::config::Config;
use copygen::dispatch::plan_registry;
use copygen::emit::EmitOptions;
use copygen::fingerprint::Drift;
use copygen::registry::{builtin, Device, RegistryError};
use copygen::{check_files, generate_all, load_registry, write_files};

fn sample_registry_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/registries/aten.toml"))
}

#[test]
fn test_sample_registry_matches_builtin() {
    let from_file = load_registry(Some(sample_registry_path())).unwrap();
    let built_in = builtin();
    assert_eq!(from_file.len(), built_in.len());
    for (a, b) in from_file.iter().zip(built_in.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.case_id, b.case_id);
        assert_eq!(a.th_tensor, b.th_tensor);
    }

    let options = EmitOptions::default();
    let a = generate_all(&from_file, &Device::ALL, &options).unwrap();
    let b = generate_all(&built_in, &Device::ALL, &options).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.fingerprint, y.fingerprint);
    }
}

#[test]
fn test_config_driven_generation_and_check() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("types.toml"),
        r#"
[[type]]
backend = "CPU"
scalar = "Float"
id = 1

[[type]]
backend = "CUDA"
scalar = "Float"
id = 2

[[type]]
backend = "CPU"
scalar = "Double"
id = 3
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("copygen.toml"),
        "[generator]\nregistry = \"types.toml\"\nout_dir = \"out\"\n",
    )
    .unwrap();

    let nested = dir.path().join("sub");
    std::fs::create_dir_all(&nested).unwrap();
    let config = Config::discover(&nested).unwrap();
    let registry = load_registry(config.registry.as_deref()).unwrap();
    assert_eq!(registry.len(), 3);

    let files = generate_all(&registry, &config.backends, &config.emit_options()).unwrap();
    let written = write_files(&files, &config.out_dir).unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join("out/CopyCPU.cpp"),
            dir.path().join("out/CopyCUDA.cpp")
        ]
    );

    let cpu = std::fs::read_to_string(&written[0]).unwrap();
    assert!(cpu.contains("Tensor & CPUDoubleType::s_copy_("));
    assert!(cpu.contains("THDoubleTensor_copyFloat("));
    assert!(!cpu.contains("CUDA"));

    let cuda = std::fs::read_to_string(&written[1]).unwrap();
    assert!(cuda.contains("THCudaTensor_copyAsyncCPU("));
    assert!(cuda.contains("THDoubleTensor_copyCudaFloat("));

    assert!(check_files(&files, &config.out_dir)
        .iter()
        .all(|(_, d)| d.is_unchanged()));

    // a registry change shows up as drift against the written files
    std::fs::write(
        dir.path().join("types.toml"),
        "[[type]]\nbackend = \"CPU\"\nscalar = \"Float\"\nid = 1\n",
    )
    .unwrap();
    let shrunk = load_registry(config.registry.as_deref()).unwrap();
    let regenerated = generate_all(&shrunk, &config.backends, &config.emit_options()).unwrap();
    let states = check_files(&regenerated, &config.out_dir);
    assert!(states
        .iter()
        .all(|(_, d)| matches!(d, Drift::Changed { .. })));
}

#[test]
fn test_invalid_registry_reports_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    let text = "[[type]]\nbackend = \"CPU\"\nscalar = \"Float\"\nid = 1\ndensity = \"Sparse\"\n";
    std::fs::write(&path, text).unwrap();

    let err = load_registry(Some(&path)).unwrap_err();
    assert!(matches!(err, RegistryError::CpuNotDense { .. }));
    assert!(!err.span().is_dummy());

    let rendered = err.to_diagnostic().render_to_string("bad.toml", text);
    assert!(rendered.contains("bad.toml"));
}

#[test]
fn test_builtin_audit_is_clean() {
    let registry = builtin();
    let plans = plan_registry(&registry).unwrap();
    let report = audit(&registry, &plans);
    assert!(report.is_clean(), "{}", report.format_report());
    assert_eq!(report.pairs.len(), 30 * 30);
}
