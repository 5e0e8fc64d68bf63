use super::*;
use crate::fingerprint::Drift;

#[test]
fn test_builtin_when_no_path() {
    let registry = load_registry(None).unwrap();
    assert_eq!(registry.len(), 30);
    assert!(registry.source().is_none());
}

#[test]
fn test_generate_both_backends() {
    let registry = registry::builtin();
    let files = generate_all(&registry, &Device::ALL, &EmitOptions::default()).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].file_name, "CopyCPU.cpp");
    assert_eq!(files[1].file_name, "CopyCUDA.cpp");
    assert_eq!(files[0].fingerprint, Fingerprint::of(&files[0].contents));
    assert_ne!(files[0].fingerprint, files[1].fingerprint);
}

#[test]
fn test_generate_is_reproducible() {
    let registry = registry::builtin();
    let a = generate(&registry, Device::Cuda, &EmitOptions::default()).unwrap();
    let b = generate(&registry, Device::Cuda, &EmitOptions::default()).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn test_write_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("gen");
    let registry = registry::builtin();
    let files = generate_all(&registry, &[Device::Cpu], &EmitOptions::default()).unwrap();

    let before = check_files(&files, &out);
    assert_eq!(before[0].1, Drift::Missing);

    let written = write_files(&files, &out).unwrap();
    assert_eq!(written, vec![out.join("CopyCPU.cpp")]);
    assert!(check_files(&files, &out)[0].1.is_unchanged());

    std::fs::write(&written[0], "stale").unwrap();
    assert!(matches!(
        check_files(&files, &out)[0].1,
        Drift::Changed { .. }
    ));
}

#[test]
fn test_load_missing_registry_is_io_error() {
    let err = load_registry(Some(Path::new("/nonexistent/types.toml"))).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
}
