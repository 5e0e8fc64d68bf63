use std::path::PathBuf;

use thiserror::Error;

use super::{Backend, Density, Device};
use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Why a registry cannot be used for generation.
///
/// Every variant aborts generation: no output is written for a
/// malformed registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read registry '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registry: {message}")]
    Parse { message: String, span: Span },

    #[error("type '{name}': unknown {field} '{value}'")]
    UnknownValue {
        name: String,
        field: &'static str,
        value: String,
        span: Span,
    },

    #[error("type '{name}' is CPU-backed but declared {density}")]
    CpuNotDense {
        name: String,
        density: Density,
        span: Span,
    },

    #[error("type '{name}' has backend {backend} but declared {density}")]
    DensityMismatch {
        name: String,
        backend: Backend,
        density: Density,
        span: Span,
    },

    #[error("type '{name}' has backend {backend} but declared dense backend {declared}")]
    DenseBackendMismatch {
        name: String,
        backend: Backend,
        declared: Device,
        span: Span,
    },

    #[error("case id {case_id} is used by both '{first}' and '{second}'")]
    DuplicateCaseId {
        case_id: u32,
        first: String,
        second: String,
        span: Span,
    },

    #[error("type name '{name}' is registered twice")]
    DuplicateName { name: String, span: Span },
}

impl RegistryError {
    pub fn span(&self) -> Span {
        match self {
            RegistryError::Io { .. } => Span::dummy(),
            RegistryError::Parse { span, .. }
            | RegistryError::UnknownValue { span, .. }
            | RegistryError::CpuNotDense { span, .. }
            | RegistryError::DensityMismatch { span, .. }
            | RegistryError::DenseBackendMismatch { span, .. }
            | RegistryError::DuplicateCaseId { span, .. }
            | RegistryError::DuplicateName { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string(), self.span());
        match self {
            RegistryError::Io { .. } => diag.with_help(
                "pass --registry, or omit it to use the built-in registry".to_string(),
            ),
            RegistryError::UnknownValue { field, .. } => {
                let allowed = match *field {
                    "backend" => "CPU, CUDA, SparseCPU, SparseCUDA",
                    "density" => "Dense, Sparse",
                    "dense_backend" => "CPU, CUDA",
                    _ => "Byte, Char, Double, Float, Int, Long, Short, Half",
                };
                diag.with_help(format!("expected one of: {}", allowed))
            }
            RegistryError::CpuNotDense { .. } => diag
                .with_note(
                    "CPU destinations redispatch unmatched copies, which requires Dense"
                        .to_string(),
                )
                .with_help("declare the type with backend \"SparseCPU\"".to_string()),
            RegistryError::DuplicateCaseId { .. } => diag.with_note(
                "case ids are dispatch keys and must be unique across the registry".to_string(),
            ),
            _ => diag,
        }
    }
}
