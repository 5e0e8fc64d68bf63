mod cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::audit::{cmd_audit, AuditArgs};
use cli::generate::{cmd_generate, GenerateArgs};
use cli::hash::{cmd_hash, HashArgs};
use cli::plan::{cmd_plan, PlanArgs};
use cli::types::{cmd_types, TypesArgs};

#[derive(Parser)]
#[command(
    name = "copygen",
    version,
    about = "Generate per-type tensor copy dispatch tables"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write CopyCPU.cpp / CopyCUDA.cpp (or check them with --check)
    Generate(GenerateArgs),
    /// Show the dispatch tables without emitting C++
    Plan(PlanArgs),
    /// Replay dispatch for every type pair and report loops
    Audit(AuditArgs),
    /// Show content hashes of generated files (BLAKE3)
    Hash(HashArgs),
    /// List the types in the registry
    Types(TypesArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "copygen=debug" } else { "copygen=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => cmd_generate(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Audit(args) => cmd_audit(args),
        Command::Hash(args) => cmd_hash(args),
        Command::Types(args) => cmd_types(args),
    }
}
