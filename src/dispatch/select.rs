use super::{admit, AsyncVariant, Direction, PairDecision};
use crate::registry::TypeDescriptor;

/// Classify an ordered pair: which copy primitive, whether the CUDA state
/// is threaded through, and whether a non-blocking attempt precedes the
/// synchronous copy.
///
/// The synchronous copy is always emitted. The async variant is only an
/// early exit taken when the caller passes `non_blocking`.
pub fn classify(
    primary: &TypeDescriptor,
    other: &TypeDescriptor,
    direction: Direction,
) -> PairDecision {
    if !admit(primary, other, direction) {
        return PairDecision::rejected();
    }

    let (_, source) = direction.roles(primary, other);
    let needs_cuda_state = primary.is_cuda() || other.is_cuda();
    // The primitive is named after the source storage: a CPU destination
    // reading device memory still needs the Cuda variant.
    let use_cuda_kernel = source.is_cuda();

    let async_variant =
        if primary.scalar == other.scalar && primary.is_cuda() && other.is_cpu() {
            match direction {
                Direction::CopyInto => AsyncVariant::FromCpuHost,
                Direction::CopyFrom => AsyncVariant::FromCudaDevice,
            }
        } else {
            AsyncVariant::None
        };

    PairDecision {
        admitted: true,
        needs_cuda_state,
        use_cuda_kernel,
        async_variant,
    }
}
