use super::{Backend, Density, Device, Registry, ScalarKind, TypeDescriptor};

/// The library's full type set: every scalar kind on CPU and CUDA, dense
/// and sparse (no sparse Half).
///
/// Case ids are consecutive in device-major, dense-before-sparse order,
/// so they stay stable as long as this table does.
pub fn builtin() -> Registry {
    let mut types = Vec::new();
    let mut next_id = 0u32;
    for device in Device::ALL {
        for density in [Density::Dense, Density::Sparse] {
            for scalar in ScalarKind::ALL {
                if density == Density::Sparse && scalar == ScalarKind::Half {
                    continue;
                }
                types.push(TypeDescriptor::new(
                    Backend::of(device, density),
                    scalar,
                    next_id,
                ));
                next_id += 1;
            }
        }
    }
    Registry {
        types,
        source: None,
    }
}
