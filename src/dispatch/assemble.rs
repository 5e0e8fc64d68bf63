use rayon::prelude::*;

use super::{
    classify, BackendPlan, CopyCase, DispatchBody, DispatchFunction, Direction, FallbackPolicy,
    TypePlan,
};
use crate::registry::{Density, Device, Registry, RegistryError, TypeDescriptor};

/// Build `dest`'s copy-into function over the candidate sources `all`.
///
/// Cases follow the order of `all`. A CPU destination redispatches
/// unmatched sources to their copy-from; any other destination raises.
/// Fails if `dest` is CPU-backed but not Dense, since the redispatch
/// fallback would then be taken for types it cannot serve.
pub fn build_copy_into<'r, I>(
    dest: &'r TypeDescriptor,
    all: I,
) -> Result<DispatchFunction<'r>, RegistryError>
where
    I: IntoIterator<Item = &'r TypeDescriptor>,
{
    let fallback = if dest.is_cpu() {
        if dest.density != Density::Dense {
            return Err(RegistryError::CpuNotDense {
                name: dest.name.clone(),
                density: dest.density,
                span: dest.span,
            });
        }
        FallbackPolicy::Redispatch
    } else {
        FallbackPolicy::TerminalError
    };

    Ok(DispatchFunction {
        owner: dest,
        direction: Direction::CopyInto,
        body: DispatchBody::Table {
            cases: collect_cases(dest, all, Direction::CopyInto),
            fallback,
        },
    })
}

/// Build `src`'s copy-from function over the candidate destinations `all`.
///
/// A type owned by the CPU file forwards to the destination's copy-into
/// with roles swapped and has no table of its own.
pub fn build_copy_from<'r, I>(src: &'r TypeDescriptor, all: I) -> DispatchFunction<'r>
where
    I: IntoIterator<Item = &'r TypeDescriptor>,
{
    let body = if src.dense_backend == Device::Cpu {
        DispatchBody::RoleSwap
    } else {
        DispatchBody::Table {
            cases: collect_cases(src, all, Direction::CopyFrom),
            fallback: FallbackPolicy::TerminalError,
        }
    };
    DispatchFunction {
        owner: src,
        direction: Direction::CopyFrom,
        body,
    }
}

fn collect_cases<'r, I>(
    primary: &'r TypeDescriptor,
    all: I,
    direction: Direction,
) -> Vec<CopyCase<'r>>
where
    I: IntoIterator<Item = &'r TypeDescriptor>,
{
    all.into_iter()
        .filter_map(|other| {
            let decision = classify(primary, other, direction);
            if !decision.admitted {
                return None;
            }
            let (destination, source) = direction.roles(primary, other);
            Some(CopyCase {
                case_id: other.case_id,
                destination,
                source,
                decision,
            })
        })
        .collect()
}

/// Plan the output file for `device`.
///
/// The CPU file only sees CPU-owned types, both as owners and as case
/// candidates, so it never references CUDA symbols. The CUDA file sees
/// the whole registry because it owns all cross-device copies.
pub fn plan_backend(
    registry: &Registry,
    device: Device,
) -> Result<BackendPlan<'_>, RegistryError> {
    let candidates: Vec<&TypeDescriptor> = match device {
        Device::Cpu => registry.owned_by(Device::Cpu).collect(),
        Device::Cuda => registry.iter().collect(),
    };
    let owners: Vec<&TypeDescriptor> = registry.owned_by(device).collect();

    // Each type is planned independently; collect keeps registry order.
    let types = owners
        .par_iter()
        .map(|&owner| {
            Ok(TypePlan {
                owner,
                copy_into: build_copy_into(owner, candidates.iter().copied())?,
                copy_from: build_copy_from(owner, candidates.iter().copied()),
            })
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;

    let cases: usize = types
        .iter()
        .map(|t| t.copy_into.cases().len() + t.copy_from.cases().len())
        .sum();
    tracing::debug!(device = %device, types = types.len(), cases, "planned copy dispatch");

    Ok(BackendPlan {
        device,
        includes: candidates,
        types,
    })
}

/// Plan every output file, in `Device::ALL` order.
pub fn plan_registry(registry: &Registry) -> Result<Vec<BackendPlan<'_>>, RegistryError> {
    Device::ALL
        .into_iter()
        .map(|device| plan_backend(registry, device))
        .collect()
}
