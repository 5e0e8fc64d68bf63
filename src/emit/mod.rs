//! Source emission: renders a `BackendPlan` as one C++ translation unit.
//!
//! The dispatch decisions are already made; this layer only spells them.
//! Output is a pure function of the plan and the options, so identical
//! registries produce byte-identical files.

mod cpp;


use crate::dispatch::BackendPlan;
use crate::registry::Device;

pub use cpp::dispatch_function as render_function;

/// Knobs that change the spelling of emitted code, not its decisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Expression passed as the first argument of CUDA copy primitives.
    pub cuda_state: String,
    /// Output file stem; the device name and `.cpp` are appended.
    pub file_prefix: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            cuda_state: "context->thc_state".to_string(),
            file_prefix: "Copy".to_string(),
        }
    }
}

impl EmitOptions {
    /// e.g. `CopyCPU.cpp`.
    pub fn file_name(&self, device: Device) -> String {
        format!("{}{}.cpp", self.file_prefix, device.name())
    }
}

/// Render the full translation unit for `plan`.
pub fn render_backend(plan: &BackendPlan<'_>, options: &EmitOptions) -> String {
    let mut out = cpp::file_prologue(plan);

    let functions: Vec<String> = plan
        .types
        .iter()
        .flat_map(|t| {
            [
                cpp::dispatch_function(&t.copy_into, options),
                cpp::dispatch_function(&t.copy_from, options),
            ]
        })
        .collect();

    out.push_str("namespace at {\n\n");
    out.push_str(&functions.join("\n"));
    out.push_str("\n}\n");
    out
}
