//! TOML registry files.
//!
//! ```toml
//! [[type]]
//! name = "CPUFloatType"      # optional, derived from backend + scalar
//! backend = "CPU"            # CPU | CUDA | SparseCPU | SparseCUDA
//! scalar = "Float"
//! id = 3
//! density = "Dense"          # optional, must agree with backend
//! dense_backend = "CPU"      # optional, must agree with backend
//! tensor = "CPUFloatTensor"  # optional
//! th_tensor = "THFloatTensor" # optional
//! ```

use std::path::Path;

use serde::Deserialize;
use toml::Spanned;

use super::{
    validate, Backend, Density, Device, Registry, RegistryError, RegistrySource, ScalarKind,
    TypeDescriptor,
};
use crate::span::Span;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistry {
    #[serde(rename = "type", default)]
    types: Vec<Spanned<RawType>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    name: Option<String>,
    backend: String,
    scalar: String,
    id: u32,
    density: Option<String>,
    dense_backend: Option<String>,
    tensor: Option<String>,
    th_tensor: Option<String>,
}

/// Read and validate a registry file.
pub fn load(path: &Path) -> Result<Registry, RegistryError> {
    let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

/// Parse and validate registry text. `path` is only recorded for
/// diagnostics.
pub fn parse(text: &str, path: &Path) -> Result<Registry, RegistryError> {
    let raw: RawRegistry = toml::from_str(text).map_err(|e| RegistryError::Parse {
        message: e.message().to_string(),
        span: e.span().map(Span::from).unwrap_or_default(),
    })?;

    let types = raw
        .types
        .into_iter()
        .map(|entry| {
            let span = Span::from(entry.span());
            descriptor(entry.into_inner(), span)
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate(&types)?;
    tracing::debug!(path = %path.display(), types = types.len(), "loaded registry");

    Ok(Registry {
        types,
        source: Some(RegistrySource {
            path: path.to_path_buf(),
            text: text.to_string(),
        }),
    })
}

fn descriptor(raw: RawType, span: Span) -> Result<TypeDescriptor, RegistryError> {
    let label = raw
        .name
        .clone()
        .unwrap_or_else(|| format!("{}{}", raw.backend, raw.scalar));
    let unknown = |field: &'static str, value: &str| RegistryError::UnknownValue {
        name: label.clone(),
        field,
        value: value.to_string(),
        span,
    };

    let backend =
        Backend::from_name(&raw.backend).ok_or_else(|| unknown("backend", &raw.backend))?;
    let scalar =
        ScalarKind::from_name(&raw.scalar).ok_or_else(|| unknown("scalar kind", &raw.scalar))?;
    let density = match raw.density.as_deref() {
        Some(value) => Density::from_name(value).ok_or_else(|| unknown("density", value))?,
        None => backend.density(),
    };
    let dense_backend = match raw.dense_backend.as_deref() {
        Some(value) => Device::from_name(value).ok_or_else(|| unknown("dense_backend", value))?,
        None => backend.device(),
    };

    let derived = TypeDescriptor::new(backend, scalar, raw.id);
    Ok(TypeDescriptor {
        name: raw.name.unwrap_or(derived.name),
        backend,
        density,
        dense_backend,
        scalar,
        case_id: raw.id,
        tensor: raw.tensor.unwrap_or(derived.tensor),
        th_tensor: raw.th_tensor.unwrap_or(derived.th_tensor),
        span,
    })
}
