use clap::Args;

use super::{load_session, SourceArgs};

#[derive(Args)]
pub struct TypesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub fn cmd_types(args: TypesArgs) {
    let session = load_session(&args.source);
    println!(
        "{:>4}  {:<24} {:<11} {:<7} {:<6} {:<22} {}",
        "id", "name", "backend", "scalar", "file", "tensor", "TH tensor"
    );
    for t in &session.registry {
        println!(
            "{:>4}  {:<24} {:<11} {:<7} {:<6} {:<22} {}",
            t.case_id,
            t.name,
            t.backend.name(),
            t.scalar.name(),
            t.dense_backend.name(),
            t.tensor,
            t.th_tensor
        );
    }
}
