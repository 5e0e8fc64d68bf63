use super::Direction;
use crate::registry::TypeDescriptor;

/// Whether a case for `(primary, other)` is generated in `direction`.
///
/// Sparse copies are not implemented, so any pair touching a Sparse type
/// is rejected. In copy-into, a CUDA source with a CPU destination is
/// rejected too: the CPU type's fallback redispatches it to the CUDA
/// type's copy-from, which owns all cross-device logic.
pub fn admit(primary: &TypeDescriptor, other: &TypeDescriptor, direction: Direction) -> bool {
    if primary.is_sparse() || other.is_sparse() {
        return false;
    }
    match direction {
        Direction::CopyInto => !(other.is_cuda() && primary.is_cpu()),
        // CPU-dense copy-from never reaches the filter (role swap).
        Direction::CopyFrom => true,
    }
}
