//! Machine-readable JSON dump of dispatch plans.
//!
//! Lists every generated function with its cases and fallback, for
//! reviewing regenerated tables in CI without reading C++. Uses manual
//! JSON formatting; field order is fixed so output diffs cleanly.

use crate::dispatch::{BackendPlan, CopyCase, DispatchFunction};

pub const REPORT_VERSION: u32 = 1;

// ─── JSON Helpers ──────────────────────────────────────────────────

/// Escape a string for JSON output.
fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn json_str(key: &str, value: &str) -> String {
    format!("\"{}\": \"{}\"", key, json_escape(value))
}

fn json_uint(key: &str, value: u64) -> String {
    format!("\"{}\": {}", key, value)
}

fn json_bool(key: &str, value: bool) -> String {
    format!("\"{}\": {}", key, if value { "true" } else { "false" })
}

// ─── Plan Serialization ────────────────────────────────────────────

fn case_json(case: &CopyCase<'_>) -> String {
    let fields = [
        json_uint("case_id", u64::from(case.case_id)),
        json_str("source", &case.source.name),
        json_str("destination", &case.destination.name),
        json_bool("needs_cuda_state", case.decision.needs_cuda_state),
        json_bool("use_cuda_kernel", case.decision.use_cuda_kernel),
        json_str("async", case.decision.async_variant.name()),
    ];
    format!("{{ {} }}", fields.join(", "))
}

fn function_json(f: &DispatchFunction<'_>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let inner = " ".repeat(indent + 2);
    let mut lines = vec![
        format!("{}{}", inner, json_str("type", &f.owner.name)),
        format!("{}{}", inner, json_str("direction", f.direction.name())),
    ];
    match f.fallback() {
        None => lines.push(format!("{}{}", inner, json_str("kind", "role_swap"))),
        Some(fallback) => {
            lines.push(format!("{}{}", inner, json_str("kind", "table")));
            lines.push(format!("{}{}", inner, json_str("fallback", fallback.name())));
            let cases: Vec<String> = f
                .cases()
                .iter()
                .map(|c| format!("{}  {}", inner, case_json(c)))
                .collect();
            if cases.is_empty() {
                lines.push(format!("{}\"cases\": []", inner));
            } else {
                lines.push(format!(
                    "{}\"cases\": [\n{}\n{}]",
                    inner,
                    cases.join(",\n"),
                    inner
                ));
            }
        }
    }
    format!("{}{{\n{}\n{}}}", pad, lines.join(",\n"), pad)
}

/// Serialize a backend plan as pretty-printed JSON.
pub fn plan_to_json(plan: &BackendPlan<'_>) -> String {
    let functions: Vec<String> = plan.functions().map(|f| function_json(f, 4)).collect();
    let mut out = String::from("{\n");
    out.push_str(&format!("  {},\n", json_uint("version", u64::from(REPORT_VERSION))));
    out.push_str(&format!("  {},\n", json_str("backend", plan.device.name())));
    out.push_str(&format!(
        "  {},\n",
        json_uint("includes", plan.includes.len() as u64)
    ));
    if functions.is_empty() {
        out.push_str("  \"functions\": []\n");
    } else {
        out.push_str(&format!("  \"functions\": [\n{}\n  ]\n", functions.join(",\n")));
    }
    out.push_str("}\n");
    out
}

/// One line per function, for terminals.
pub fn plan_to_text(plan: &BackendPlan<'_>) -> String {
    let mut out = format!("{} output: {} types\n", plan.device, plan.types.len());
    for f in plan.functions() {
        let body = match f.fallback() {
            None => "role swap".to_string(),
            Some(fallback) => {
                let ids: Vec<String> = f.case_ids().iter().map(|id| id.to_string()).collect();
                format!("[{}] else {}", ids.join(", "), fallback.name())
            }
        };
        out.push_str(&format!(
            "  {:<24} {:<10} {}\n",
            f.owner.name,
            f.direction.name(),
            body
        ));
    }
    out
}
