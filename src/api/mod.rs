//! Top-level entry points: registry → plan → C++ text → files on disk.

use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::dispatch::plan_backend;
use crate::emit::{render_backend, EmitOptions};
use crate::fingerprint::{drift, Drift, Fingerprint};
use crate::registry::{self, Device, Registry, RegistryError};
use crate::span::Span;

#[cfg(test)]
mod tests;

/// One emitted translation unit.
#[derive(Clone, Debug)]
pub struct GeneratedFile {
    pub device: Device,
    pub file_name: String,
    pub contents: String,
    pub fingerprint: Fingerprint,
}

/// Load a registry file, or the built-in registry when `path` is `None`.
pub fn load_registry(path: Option<&Path>) -> Result<Registry, RegistryError> {
    match path {
        Some(path) => registry::load(path),
        None => Ok(registry::builtin()),
    }
}

/// Plan and render the output file for one backend.
pub fn generate(
    registry: &Registry,
    device: Device,
    options: &EmitOptions,
) -> Result<GeneratedFile, RegistryError> {
    let plan = plan_backend(registry, device)?;
    let contents = render_backend(&plan, options);
    let fingerprint = Fingerprint::of(&contents);
    tracing::info!(
        backend = device.name(),
        functions = plan.types.len() * 2,
        bytes = contents.len(),
        %fingerprint,
        "generated"
    );
    Ok(GeneratedFile {
        device,
        file_name: options.file_name(device),
        contents,
        fingerprint,
    })
}

/// Generate every backend in `devices`, in order.
pub fn generate_all(
    registry: &Registry,
    devices: &[Device],
    options: &EmitOptions,
) -> Result<Vec<GeneratedFile>, RegistryError> {
    devices
        .iter()
        .map(|&device| generate(registry, device, options))
        .collect()
}

/// Write generated files into `out_dir`, creating it if needed.
pub fn write_files(files: &[GeneratedFile], out_dir: &Path) -> Result<Vec<PathBuf>, Diagnostic> {
    std::fs::create_dir_all(out_dir).map_err(|e| {
        Diagnostic::error(
            format!("cannot create '{}': {}", out_dir.display(), e),
            Span::dummy(),
        )
    })?;
    files
        .iter()
        .map(|file| {
            let path = out_dir.join(&file.file_name);
            std::fs::write(&path, &file.contents).map_err(|e| {
                Diagnostic::error(
                    format!("cannot write '{}': {}", path.display(), e),
                    Span::dummy(),
                )
            })?;
            Ok(path)
        })
        .collect()
}

/// Compare generated files with what is in `out_dir`, without writing.
pub fn check_files(files: &[GeneratedFile], out_dir: &Path) -> Vec<(PathBuf, Drift)> {
    files
        .iter()
        .map(|file| {
            let path = out_dir.join(&file.file_name);
            let state = drift(&path, &file.contents);
            (path, state)
        })
        .collect()
}

/// Render a registry error against the registry's source text, if any.
pub fn render_registry_error(err: &RegistryError, registry_path: Option<&Path>) {
    let diag = err.to_diagnostic();
    match registry_path {
        Some(path) => {
            let source = std::fs::read_to_string(path).ok();
            diag.render(&path.display().to_string(), source.as_deref());
        }
        None => diag.render("<builtin>", None),
    }
}
