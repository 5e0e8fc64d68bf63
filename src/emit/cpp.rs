use super::EmitOptions;
use crate::dispatch::{
    BackendPlan, CopyCase, CopyPath, Direction, DispatchBody, DispatchFunction, FallbackPolicy,
};
use crate::registry::Device;

const GENERATED_MARKER: &str = "// code generated by copygen";

/// Includes up to and including the per-type headers, plus a blank line.
pub(super) fn file_prologue(plan: &BackendPlan<'_>) -> String {
    let mut out = String::new();
    out.push_str("#include \"ATen/Config.h\"\n\n");
    out.push_str("#include \"TH/TH.h\"\n");
    if plan.device == Device::Cuda {
        out.push_str("#undef THNN_\n");
        out.push_str("#include \"THC/THC.h\"\n");
    }
    out.push_str("#include \"ATen/Utils.h\"\n");
    for ty in &plan.includes {
        out.push_str(&format!("#include \"ATen/{}.h\"\n", ty.name));
        out.push_str(&format!("#include \"ATen/{}.h\"\n", ty.tensor));
    }
    out.push('\n');
    out
}

/// One `s_copy_` or `_s_copy_from` definition, ending with `}\n`.
pub fn dispatch_function(f: &DispatchFunction<'_>, options: &EmitOptions) -> String {
    let owner = f.owner;
    let signature = match f.direction {
        Direction::CopyInto => format!(
            "Tensor & {}::s_copy_(Tensor & dst, const Tensor & src, bool non_blocking) const {{\n",
            owner.name
        ),
        Direction::CopyFrom => format!(
            "Tensor & {}::_s_copy_from(const Tensor & src, Tensor & dst, bool non_blocking) const {{\n",
            owner.name
        ),
    };

    let (cases, fallback) = match &f.body {
        DispatchBody::RoleSwap => {
            return format!(
                "{}  return dst.type().s_copy_(dst, src, non_blocking);\n}}\n",
                signature
            );
        }
        DispatchBody::Table { cases, fallback } => (cases, *fallback),
    };

    // copy-into checks and switches on the opposite tensors of copy-from
    let (this, keyed) = match f.direction {
        Direction::CopyInto => ("dst", "src"),
        Direction::CopyFrom => ("src", "dst"),
    };

    let mut out = signature;
    out.push_str(&format!("  {}\n", GENERATED_MARKER));
    out.push_str(&format!(
        "  checked_cast_tensor<{}>({}.pImpl, \"{}\", 0, false);\n",
        owner.tensor, this, this
    ));
    out.push_str(&format!(
        "  switch (static_cast<int>({}.type().ID())) {{\n",
        keyed
    ));
    for case in cases {
        out.push_str(&render_case(case, f.direction, options));
    }
    out.push_str("    default:\n");
    out.push_str(&format!("      {}\n", fallthrough(f.direction, fallback)));
    out.push_str("  }\n");
    out.push_str("  dst.pImpl->setScalar(src.pImpl->isScalar());\n");
    out.push_str("  return dst;\n");
    out.push_str("}\n");
    out
}

fn fallthrough(direction: Direction, fallback: FallbackPolicy) -> &'static str {
    match (fallback, direction) {
        (FallbackPolicy::Redispatch, _) => {
            "return src.type()._s_copy_from(src, dst, non_blocking);"
        }
        (FallbackPolicy::TerminalError, Direction::CopyInto) => {
            "AT_ERROR(\"copy does not support \", src.type().toString(), \" to \", toString(), \" copy.\");"
        }
        (FallbackPolicy::TerminalError, Direction::CopyFrom) => {
            "AT_ERROR(\"copy does not support \", toString(), \" to \", dst.type().toString(), \" copy.\");"
        }
    }
}

fn render_case(case: &CopyCase<'_>, direction: Direction, options: &EmitOptions) -> String {
    let keyed = match direction {
        Direction::CopyInto => case.source,
        Direction::CopyFrom => case.destination,
    };
    let mut out = format!("    case {}: // {}\n", case.case_id, keyed.name);
    for path in case.paths() {
        match path {
            CopyPath::AsyncCpu | CopyPath::AsyncCuda => {
                out.push_str("      if (non_blocking) {\n");
                out.push_str(&format!("        {}\n", copy_call(case, path, options)));
                out.push_str("        break;\n");
                out.push_str("      }\n");
            }
            CopyPath::Sync => {
                out.push_str(&format!("      {}\n", copy_call(case, path, options)));
            }
        }
    }
    out.push_str("      break;\n");
    out
}

/// `<THTensor>_copy...(<state, >dst, src);` named after the destination's
/// primitive tensor.
fn copy_call(case: &CopyCase<'_>, path: CopyPath, options: &EmitOptions) -> String {
    let (dst, src) = (case.destination, case.source);
    let primitive = match path {
        CopyPath::AsyncCpu => "copyAsyncCPU".to_string(),
        CopyPath::AsyncCuda => "copyAsyncCuda".to_string(),
        CopyPath::Sync => {
            let cuda = if case.decision.use_cuda_kernel {
                "Cuda"
            } else {
                ""
            };
            format!("copy{}{}", cuda, src.scalar.name())
        }
    };
    let state = if case.decision.needs_cuda_state {
        format!("{}, ", options.cuda_state)
    } else {
        String::new()
    };
    format!(
        "{}_{}({}static_cast<{}*>(dst.pImpl)->tensor, static_cast<{}*>(src.pImpl)->tensor);",
        dst.th_tensor, primitive, state, dst.tensor, src.tensor
    )
}
