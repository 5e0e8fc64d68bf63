//! Type registry: every concrete tensor type the generator covers.
//!
//! A type is a (backend, scalar kind) combination with a stable numeric
//! case id. The registry is loaded once, validated, and then only read.
//!
//! Registry-level backends follow the library's naming: `CPU`, `CUDA`,
//! `SparseCPU`, `SparseCUDA`. Density and the dense device are implied by
//! the backend. "CPU-backed" always means backend `CPU` exactly.

mod builtin;
mod error;
mod load;
mod validate;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::span::Span;

pub use builtin::builtin;
pub use error::RegistryError;
pub use load::{load, parse};
pub use validate::validate;

// ─── Enum Domains ──────────────────────────────────────────────────

/// Physical device a type's storage lives on. Also names a generation
/// target: each device gets its own output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Device {
    #[serde(rename = "CPU", alias = "cpu")]
    Cpu,
    #[serde(rename = "CUDA", alias = "cuda")]
    Cuda,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Cpu, Device::Cuda];

    pub fn name(self) -> &'static str {
        match self {
            Device::Cpu => "CPU",
            Device::Cuda => "CUDA",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CPU" | "cpu" => Some(Device::Cpu),
            "CUDA" | "cuda" => Some(Device::Cuda),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Density {
    Dense,
    Sparse,
}

impl Density {
    pub fn name(self) -> &'static str {
        match self {
            Density::Dense => "Dense",
            Density::Sparse => "Sparse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Dense" | "dense" => Some(Density::Dense),
            "Sparse" | "sparse" => Some(Density::Sparse),
            _ => None,
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Library backend of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Cpu,
    Cuda,
    SparseCpu,
    SparseCuda,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::Cpu,
        Backend::SparseCpu,
        Backend::Cuda,
        Backend::SparseCuda,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Cpu => "CPU",
            Backend::Cuda => "CUDA",
            Backend::SparseCpu => "SparseCPU",
            Backend::SparseCuda => "SparseCUDA",
        }
    }

    /// Accepts the canonical spelling or its lowercase form.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == name || b.name().to_ascii_lowercase() == name)
    }

    /// Compose a backend from a device and a density.
    pub fn of(device: Device, density: Density) -> Self {
        match (device, density) {
            (Device::Cpu, Density::Dense) => Backend::Cpu,
            (Device::Cuda, Density::Dense) => Backend::Cuda,
            (Device::Cpu, Density::Sparse) => Backend::SparseCpu,
            (Device::Cuda, Density::Sparse) => Backend::SparseCuda,
        }
    }

    pub fn device(self) -> Device {
        match self {
            Backend::Cpu | Backend::SparseCpu => Device::Cpu,
            Backend::Cuda | Backend::SparseCuda => Device::Cuda,
        }
    }

    pub fn density(self) -> Density {
        match self {
            Backend::Cpu | Backend::Cuda => Density::Dense,
            Backend::SparseCpu | Backend::SparseCuda => Density::Sparse,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type of a tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Half,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 8] = [
        ScalarKind::Byte,
        ScalarKind::Char,
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int,
        ScalarKind::Long,
        ScalarKind::Short,
        ScalarKind::Half,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Byte => "Byte",
            ScalarKind::Char => "Char",
            ScalarKind::Double => "Double",
            ScalarKind::Float => "Float",
            ScalarKind::Int => "Int",
            ScalarKind::Long => "Long",
            ScalarKind::Short => "Short",
            ScalarKind::Half => "Half",
        }
    }

    /// Accepts the canonical spelling or its lowercase form.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name || s.name().to_ascii_lowercase() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Type Descriptor ───────────────────────────────────────────────

/// One concrete tensor type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type class name, e.g. `CPUFloatType`.
    pub name: String,
    pub backend: Backend,
    pub density: Density,
    /// Device whose output file owns this type's functions.
    pub dense_backend: Device,
    pub scalar: ScalarKind,
    /// Dispatch key. Unique across the registry.
    pub case_id: u32,
    /// Tensor class name, e.g. `CPUFloatTensor`.
    pub tensor: String,
    /// Primitive tensor struct, e.g. `THFloatTensor` or `THCudaTensor`.
    pub th_tensor: String,
    /// Where the type was declared, dummy for built-in types.
    pub span: Span,
}

impl TypeDescriptor {
    /// Build a descriptor with the library's naming rules.
    pub fn new(backend: Backend, scalar: ScalarKind, case_id: u32) -> Self {
        Self {
            name: format!("{}{}Type", backend.name(), scalar.name()),
            backend,
            density: backend.density(),
            dense_backend: backend.device(),
            scalar,
            case_id,
            tensor: format!("{}{}Tensor", backend.name(), scalar.name()),
            th_tensor: th_tensor_name(backend, scalar),
            span: Span::dummy(),
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.backend == Backend::Cpu
    }

    pub fn is_cuda(&self) -> bool {
        self.backend == Backend::Cuda
    }

    pub fn is_sparse(&self) -> bool {
        self.density == Density::Sparse
    }
}

/// Name of the primitive tensor struct backing a type. CUDA drops the
/// scalar name for Float (`THCudaTensor`, `THCSTensor`).
pub fn th_tensor_name(backend: Backend, scalar: ScalarKind) -> String {
    let cuda_scalar = if scalar == ScalarKind::Float {
        ""
    } else {
        scalar.name()
    };
    match backend {
        Backend::Cpu => format!("TH{}Tensor", scalar.name()),
        Backend::SparseCpu => format!("THS{}Tensor", scalar.name()),
        Backend::Cuda => format!("THCuda{}Tensor", cuda_scalar),
        Backend::SparseCuda => format!("THCS{}Tensor", cuda_scalar),
    }
}

// ─── Registry ──────────────────────────────────────────────────────

/// The text a registry was parsed from, kept for diagnostics.
#[derive(Clone, Debug)]
pub struct RegistrySource {
    pub path: PathBuf,
    pub text: String,
}

/// A validated, ordered collection of type descriptors.
///
/// Insertion order is preserved: it fixes the order of emitted cases.
#[derive(Clone, Debug)]
pub struct Registry {
    types: Vec<TypeDescriptor>,
    source: Option<RegistrySource>,
}

impl Registry {
    /// Validate `types` and wrap them.
    pub fn new(types: Vec<TypeDescriptor>) -> Result<Self, RegistryError> {
        validate(&types)?;
        Ok(Self {
            types,
            source: None,
        })
    }

    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDescriptor> {
        self.types.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn by_case_id(&self, case_id: u32) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.case_id == case_id)
    }

    /// Types whose functions live in `device`'s output file.
    pub fn owned_by(&self, device: Device) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().filter(move |t| t.dense_backend == device)
    }

    pub fn source(&self) -> Option<&RegistrySource> {
        self.source.as_ref()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a TypeDescriptor;
    type IntoIter = std::slice::Iter<'a, TypeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
