use std::process;

use clap::Args;
use copygen::audit::{audit, Outcome};
use copygen::dispatch::plan_registry;

use super::{fail_registry, load_session, SourceArgs};

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// List every pair that redispatches or is unsupported
    #[arg(long)]
    pub verbose: bool,
}

pub fn cmd_audit(args: AuditArgs) {
    let session = load_session(&args.source);
    let plans = match plan_registry(&session.registry) {
        Ok(plans) => plans,
        Err(err) => fail_registry(&err, session.registry_path.as_deref()),
    };
    let report = audit(&session.registry, &plans);
    print!("{}", report.format_report());

    if args.verbose {
        println!();
        for pair in report.pairs.iter().filter(|p| !p.sparse) {
            match &pair.outcome {
                Outcome::Copied { function, hops, .. } if *hops > 0 => println!(
                    "  {} -> {}: {} hop(s), lands in {}",
                    pair.source, pair.destination, hops, function
                ),
                Outcome::Unsupported(err) => println!("  {}", err),
                _ => {}
            }
        }
    }

    if !report.is_clean() {
        eprintln!("error: dispatch audit failed");
        process::exit(1);
    }
}
