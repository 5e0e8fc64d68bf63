//! Copy-dispatch matrix generation.
//!
//! For every registered type two dispatch functions are built:
//!
//! - copy-into (`s_copy_`): the type is the destination, cases are keyed
//!   by the source type's case id;
//! - copy-from (`_s_copy_from`): the type is the source, cases are keyed
//!   by the destination type's case id.
//!
//! Pipeline per ordered pair:
//! ```text
//! (primary, other) ─→ filter::admit ─→ select::classify ─→ CopyCase
//!                                                            │
//!                  assemble::build_copy_into / build_copy_from ┘
//! ```
//!
//! Nothing here formats text; `crate::emit` renders the result.

mod assemble;
mod filter;
mod select;


use std::fmt;

use crate::registry::TypeDescriptor;

pub use assemble::{build_copy_from, build_copy_into, plan_backend, plan_registry};
pub use filter::admit;
pub use select::classify;

// ─── Per-Pair Decisions ────────────────────────────────────────────

/// Which of a type's two dispatch functions is being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The primary type is the destination.
    CopyInto,
    /// The primary type is the source.
    CopyFrom,
}

impl Direction {
    /// Order `(primary, other)` as `(destination, source)`.
    pub fn roles<'a>(
        self,
        primary: &'a TypeDescriptor,
        other: &'a TypeDescriptor,
    ) -> (&'a TypeDescriptor, &'a TypeDescriptor) {
        match self {
            Direction::CopyInto => (primary, other),
            Direction::CopyFrom => (other, primary),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::CopyInto => "copy_into",
            Direction::CopyFrom => "copy_from",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-blocking attempt made before the synchronous copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsyncVariant {
    None,
    /// Host to device, from a CUDA destination's copy-into.
    FromCpuHost,
    /// Device to host, from a CUDA source's copy-from.
    FromCudaDevice,
}

impl AsyncVariant {
    pub fn name(self) -> &'static str {
        match self {
            AsyncVariant::None => "none",
            AsyncVariant::FromCpuHost => "from_cpu_host",
            AsyncVariant::FromCudaDevice => "from_cuda_device",
        }
    }
}

/// Classification of one ordered (primary, other) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairDecision {
    pub admitted: bool,
    /// The CUDA state handle must be passed to every emitted call.
    pub needs_cuda_state: bool,
    /// The copy primitive carries the CUDA suffix.
    pub use_cuda_kernel: bool,
    pub async_variant: AsyncVariant,
}

impl PairDecision {
    pub fn rejected() -> Self {
        Self {
            admitted: false,
            needs_cuda_state: false,
            use_cuda_kernel: false,
            async_variant: AsyncVariant::None,
        }
    }

    /// Copy paths in emission order: the optional async short-circuit,
    /// then the synchronous tail. Empty for rejected pairs.
    pub fn paths(&self) -> Vec<CopyPath> {
        if !self.admitted {
            return Vec::new();
        }
        let mut paths = Vec::with_capacity(2);
        match self.async_variant {
            AsyncVariant::None => {}
            AsyncVariant::FromCpuHost => paths.push(CopyPath::AsyncCpu),
            AsyncVariant::FromCudaDevice => paths.push(CopyPath::AsyncCuda),
        }
        paths.push(CopyPath::Sync);
        paths
    }
}

/// One call expression inside a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CopyPath {
    /// `copyAsyncCPU` under `if (non_blocking)`, then break.
    AsyncCpu,
    /// `copyAsyncCuda` under `if (non_blocking)`, then break.
    AsyncCuda,
    /// Blocking `copy<Scalar>` / `copyCuda<Scalar>`.
    Sync,
}

// ─── Dispatch Functions ────────────────────────────────────────────

/// What a dispatch function does when no case matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FallbackPolicy {
    /// Hand the copy to the source type's copy-from, swapping roles.
    Redispatch,
    /// Raise "copy does not support X to Y copy."
    TerminalError,
}

impl FallbackPolicy {
    pub fn name(self) -> &'static str {
        match self {
            FallbackPolicy::Redispatch => "redispatch",
            FallbackPolicy::TerminalError => "terminal_error",
        }
    }
}

/// One switch case: the pair it covers and how it copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyCase<'r> {
    /// Dispatch key: the case id of the non-primary type.
    pub case_id: u32,
    pub destination: &'r TypeDescriptor,
    pub source: &'r TypeDescriptor,
    pub decision: PairDecision,
}

impl CopyCase<'_> {
    pub fn paths(&self) -> Vec<CopyPath> {
        self.decision.paths()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchBody<'r> {
    /// A switch over case ids with a default clause.
    Table {
        cases: Vec<CopyCase<'r>>,
        fallback: FallbackPolicy,
    },
    /// Forward to the destination's copy-into with roles swapped. Used for
    /// copy-from on CPU-dense types, which only exists for completeness.
    RoleSwap,
}

/// A generated `s_copy_` or `_s_copy_from` for one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchFunction<'r> {
    pub owner: &'r TypeDescriptor,
    pub direction: Direction,
    pub body: DispatchBody<'r>,
}

impl<'r> DispatchFunction<'r> {
    /// Cases in registry order; empty for a role swap.
    pub fn cases(&self) -> &[CopyCase<'r>] {
        match &self.body {
            DispatchBody::Table { cases, .. } => cases,
            DispatchBody::RoleSwap => &[],
        }
    }

    pub fn fallback(&self) -> Option<FallbackPolicy> {
        match &self.body {
            DispatchBody::Table { fallback, .. } => Some(*fallback),
            DispatchBody::RoleSwap => None,
        }
    }

    pub fn is_role_swap(&self) -> bool {
        matches!(self.body, DispatchBody::RoleSwap)
    }

    pub fn case_for(&self, case_id: u32) -> Option<&CopyCase<'r>> {
        self.cases().iter().find(|c| c.case_id == case_id)
    }

    pub fn case_ids(&self) -> Vec<u32> {
        self.cases().iter().map(|c| c.case_id).collect()
    }
}

/// Both dispatch functions of one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypePlan<'r> {
    pub owner: &'r TypeDescriptor,
    pub copy_into: DispatchFunction<'r>,
    pub copy_from: DispatchFunction<'r>,
}

impl<'r> TypePlan<'r> {
    pub fn function(&self, direction: Direction) -> &DispatchFunction<'r> {
        match direction {
            Direction::CopyInto => &self.copy_into,
            Direction::CopyFrom => &self.copy_from,
        }
    }
}

/// Everything one output file needs: the types whose headers it includes
/// and the types whose functions it defines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPlan<'r> {
    pub device: crate::registry::Device,
    pub includes: Vec<&'r TypeDescriptor>,
    pub types: Vec<TypePlan<'r>>,
}

impl<'r> BackendPlan<'r> {
    pub fn functions(&self) -> impl Iterator<Item = &DispatchFunction<'r>> {
        self.types
            .iter()
            .flat_map(|t| [&t.copy_into, &t.copy_from])
    }
}
