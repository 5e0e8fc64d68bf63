use std::collections::{HashMap, HashSet};

use super::{Backend, RegistryError, TypeDescriptor};

/// Check registry invariants. Stops at the first violation.
///
/// - a CPU-backed type is Dense (CPU copy-into relies on redispatch)
/// - declared density and dense backend agree with the backend
/// - case ids and type names are unique
pub fn validate(types: &[TypeDescriptor]) -> Result<(), RegistryError> {
    let mut ids: HashMap<u32, &str> = HashMap::new();
    let mut names: HashSet<&str> = HashSet::new();

    for ty in types {
        if ty.density != ty.backend.density() {
            if ty.backend == Backend::Cpu {
                return Err(RegistryError::CpuNotDense {
                    name: ty.name.clone(),
                    density: ty.density,
                    span: ty.span,
                });
            }
            return Err(RegistryError::DensityMismatch {
                name: ty.name.clone(),
                backend: ty.backend,
                density: ty.density,
                span: ty.span,
            });
        }

        if ty.dense_backend != ty.backend.device() {
            return Err(RegistryError::DenseBackendMismatch {
                name: ty.name.clone(),
                backend: ty.backend,
                declared: ty.dense_backend,
                span: ty.span,
            });
        }

        if let Some(first) = ids.insert(ty.case_id, &ty.name) {
            return Err(RegistryError::DuplicateCaseId {
                case_id: ty.case_id,
                first: first.to_string(),
                second: ty.name.clone(),
                span: ty.span,
            });
        }

        if !names.insert(&ty.name) {
            return Err(RegistryError::DuplicateName {
                name: ty.name.clone(),
                span: ty.span,
            });
        }
    }

    Ok(())
}
