use clap::Args;
use copygen::dispatch::plan_backend;
use copygen::report::{plan_to_json, plan_to_text};

use super::{fail_registry, load_session, resolve_devices, BackendArg, SourceArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Backend(s) to plan (default: from config, else all)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_plan(args: PlanArgs) {
    let session = load_session(&args.source);
    let devices = resolve_devices(args.backend, &session.config);

    let mut rendered = Vec::with_capacity(devices.len());
    for device in devices {
        let plan = match plan_backend(&session.registry, device) {
            Ok(plan) => plan,
            Err(err) => fail_registry(&err, session.registry_path.as_deref()),
        };
        rendered.push(if args.json {
            plan_to_json(&plan)
        } else {
            plan_to_text(&plan)
        });
    }

    if args.json && rendered.len() > 1 {
        print!("[\n{}]\n", rendered.join(",\n"));
    } else {
        print!("{}", rendered.join("\n"));
    }
}
