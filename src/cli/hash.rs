use clap::Args;
use copygen::fingerprint::Fingerprint;

use super::{fail_registry, load_session, resolve_devices, BackendArg, SourceArgs};

#[derive(Args)]
pub struct HashArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Backend file(s) to hash (default: from config, else all)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
    /// Show full 256-bit hashes instead of short form
    #[arg(long)]
    pub full: bool,
}

fn show(fp: &Fingerprint, full: bool) -> String {
    if full {
        fp.to_hex()
    } else {
        fp.to_short()
    }
}

pub fn cmd_hash(args: HashArgs) {
    let session = load_session(&args.source);
    let devices = resolve_devices(args.backend, &session.config);
    let options = session.config.emit_options();

    match session.registry.source() {
        Some(src) => eprintln!(
            "Registry: {} {}",
            show(&Fingerprint::of(&src.text), args.full),
            src.path.display()
        ),
        None => eprintln!("Registry: built-in ({} types)", session.registry.len()),
    }

    let files = match copygen::generate_all(&session.registry, &devices, &options) {
        Ok(files) => files,
        Err(err) => fail_registry(&err, session.registry_path.as_deref()),
    };
    for file in &files {
        println!("  {} {}", show(&file.fingerprint, args.full), file.file_name);
    }
}
