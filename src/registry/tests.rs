use std::collections::HashSet;
use std::path::Path;

use super::*;

fn parse_str(text: &str) -> Result<Registry, RegistryError> {
    parse(text, Path::new("types.toml"))
}

#[test]
fn test_builtin_shape() {
    let registry = builtin();
    // 8 dense + 7 sparse per device
    assert_eq!(registry.len(), 30);
    assert_eq!(registry.owned_by(Device::Cpu).count(), 15);
    assert_eq!(registry.owned_by(Device::Cuda).count(), 15);
    assert!(registry.get("SparseCPUHalfType").is_none());
    assert!(registry.get("SparseCUDAHalfType").is_none());
    assert!(registry.get("CPUHalfType").is_some());
}

#[test]
fn test_builtin_is_valid() {
    let registry = builtin();
    assert!(validate(registry.types()).is_ok());
    let ids: HashSet<u32> = registry.iter().map(|t| t.case_id).collect();
    assert_eq!(ids.len(), registry.len());
}

#[test]
fn test_builtin_ids_are_stable() {
    let registry = builtin();
    assert_eq!(registry.types()[0].name, "CPUByteType");
    assert_eq!(registry.types()[0].case_id, 0);
    assert_eq!(registry.get("CPUFloatType").map(|t| t.case_id), Some(3));
    assert_eq!(registry.get("SparseCPUByteType").map(|t| t.case_id), Some(8));
    assert_eq!(registry.get("CUDAByteType").map(|t| t.case_id), Some(15));
    assert_eq!(registry.get("SparseCUDAShortType").map(|t| t.case_id), Some(29));
}

#[test]
fn test_descriptor_naming_rules() {
    let cpu = TypeDescriptor::new(Backend::Cpu, ScalarKind::Float, 3);
    assert_eq!(cpu.name, "CPUFloatType");
    assert_eq!(cpu.tensor, "CPUFloatTensor");
    assert_eq!(cpu.th_tensor, "THFloatTensor");
    assert_eq!(cpu.density, Density::Dense);
    assert_eq!(cpu.dense_backend, Device::Cpu);

    let cuda = TypeDescriptor::new(Backend::Cuda, ScalarKind::Float, 18);
    assert_eq!(cuda.th_tensor, "THCudaTensor");
    let cuda_long = TypeDescriptor::new(Backend::Cuda, ScalarKind::Long, 20);
    assert_eq!(cuda_long.th_tensor, "THCudaLongTensor");

    let sparse = TypeDescriptor::new(Backend::SparseCpu, ScalarKind::Double, 10);
    assert_eq!(sparse.name, "SparseCPUDoubleType");
    assert_eq!(sparse.th_tensor, "THSDoubleTensor");
    assert_eq!(sparse.density, Density::Sparse);
    assert_eq!(sparse.dense_backend, Device::Cpu);
    assert!(sparse.is_sparse());
    assert!(!sparse.is_cpu());

    let sparse_cuda = TypeDescriptor::new(Backend::SparseCuda, ScalarKind::Float, 25);
    assert_eq!(sparse_cuda.th_tensor, "THCSTensor");
}

#[test]
fn test_names_accept_lowercase() {
    assert_eq!(ScalarKind::from_name("float"), Some(ScalarKind::Float));
    assert_eq!(ScalarKind::from_name("Float"), Some(ScalarKind::Float));
    assert_eq!(Backend::from_name("sparsecuda"), Some(Backend::SparseCuda));
    assert_eq!(Device::from_name("cuda"), Some(Device::Cuda));
    assert_eq!(Density::from_name("sparse"), Some(Density::Sparse));
    assert_eq!(ScalarKind::from_name("FLOAT"), None);

    let registry = parse_str(
        r#"
[[type]]
backend = "cpu"
scalar = "float"
id = 3
density = "dense"
"#,
    )
    .unwrap();
    assert_eq!(registry.types()[0].name, "CPUFloatType");
}

#[test]
fn test_backend_composition() {
    for backend in Backend::ALL {
        assert_eq!(Backend::of(backend.device(), backend.density()), backend);
        assert_eq!(Backend::from_name(backend.name()), Some(backend));
    }
    assert_eq!(Backend::from_name("Metal"), None);
}

#[test]
fn test_parse_minimal() {
    let registry = parse_str(
        r#"
[[type]]
backend = "CPU"
scalar = "Float"
id = 1

[[type]]
backend = "CUDA"
scalar = "Float"
id = 2
"#,
    )
    .unwrap();
    assert_eq!(registry.len(), 2);
    let cuda = registry.get("CUDAFloatType").unwrap();
    assert_eq!(cuda.case_id, 2);
    assert_eq!(cuda.tensor, "CUDAFloatTensor");
    assert_eq!(cuda.th_tensor, "THCudaTensor");
    assert!(!cuda.span.is_dummy());
    assert!(registry.source().is_some());
}

#[test]
fn test_parse_preserves_order_and_overrides() {
    let registry = parse_str(
        r#"
[[type]]
name = "MyDouble"
backend = "CPU"
scalar = "Double"
id = 40
tensor = "MyDoubleTensor"
th_tensor = "THDoubleTensor"

[[type]]
backend = "CPU"
scalar = "Byte"
id = 7
"#,
    )
    .unwrap();
    let names: Vec<&str> = registry.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["MyDouble", "CPUByteType"]);
    assert_eq!(registry.types()[0].tensor, "MyDoubleTensor");
    assert_eq!(registry.by_case_id(7).map(|t| t.scalar), Some(ScalarKind::Byte));
}

#[test]
fn test_parse_empty_registry() {
    let registry = parse_str("").unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_cpu_sparse_is_rejected() {
    let err = parse_str(
        r#"
[[type]]
name = "CPUFloatType"
backend = "CPU"
density = "Sparse"
scalar = "Float"
id = 1
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::CpuNotDense { .. }));
    assert!(!err.span().is_dummy());
}

#[test]
fn test_density_mismatch_is_rejected() {
    let err = parse_str(
        r#"
[[type]]
backend = "SparseCUDA"
density = "Dense"
scalar = "Float"
id = 1
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::DensityMismatch { .. }));
}

#[test]
fn test_dense_backend_mismatch_is_rejected() {
    let err = parse_str(
        r#"
[[type]]
backend = "SparseCPU"
dense_backend = "CUDA"
scalar = "Int"
id = 1
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::DenseBackendMismatch { .. }));
}

#[test]
fn test_duplicate_case_id_is_rejected() {
    let err = parse_str(
        r#"
[[type]]
backend = "CPU"
scalar = "Float"
id = 5

[[type]]
backend = "CUDA"
scalar = "Float"
id = 5
"#,
    )
    .unwrap_err();
    match err {
        RegistryError::DuplicateCaseId {
            case_id,
            ref first,
            ref second,
            ..
        } => {
            assert_eq!(case_id, 5);
            assert_eq!(first, "CPUFloatType");
            assert_eq!(second, "CUDAFloatType");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut types = vec![
        TypeDescriptor::new(Backend::Cpu, ScalarKind::Float, 1),
        TypeDescriptor::new(Backend::Cpu, ScalarKind::Float, 2),
    ];
    assert!(matches!(
        Registry::new(types.clone()),
        Err(RegistryError::DuplicateName { .. })
    ));
    types[1].name = "OtherFloatType".to_string();
    assert!(Registry::new(types).is_ok());
}

#[test]
fn test_unknown_values_are_reported() {
    let err = parse_str(
        r#"
[[type]]
backend = "Metal"
scalar = "Float"
id = 1
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown backend 'Metal'"));
    let diag = err.to_diagnostic();
    assert!(diag.help.unwrap().contains("SparseCUDA"));

    let err = parse_str(
        r#"
[[type]]
backend = "CPU"
scalar = "Complex"
id = 1
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown scalar kind 'Complex'"));
}

#[test]
fn test_syntax_errors_carry_a_span() {
    let err = parse_str("[[type]]\nbackend = \"CPU\"\nscalar = \n").unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
    assert!(!err.span().is_dummy());
}

#[test]
fn test_unknown_fields_are_rejected() {
    let err = parse_str(
        r#"
[[type]]
backend = "CPU"
scalar = "Float"
id = 1
layout = "strided"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("types.toml");
    std::fs::write(
        &path,
        "[[type]]\nbackend = \"CPU\"\nscalar = \"Long\"\nid = 0\n",
    )
    .unwrap();
    let registry = load(&path).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.source().unwrap().path, path);
}

#[test]
fn test_load_missing_file() {
    let err = load(Path::new("/nonexistent/types.toml")).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
    assert!(err.to_diagnostic().help.is_some());
}
