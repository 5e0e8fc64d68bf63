use std::path::PathBuf;
use std::process;

use clap::Args;
use copygen::fingerprint::Drift;

use super::{fail_registry, load_session, resolve_devices, BackendArg, SourceArgs};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Backend file(s) to emit (default: from config, else all)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
    /// Output directory (default: out_dir from config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Compare with files on disk instead of writing (exit 1 on drift)
    #[arg(long)]
    pub check: bool,
}

pub fn cmd_generate(args: GenerateArgs) {
    let session = load_session(&args.source);
    let devices = resolve_devices(args.backend, &session.config);
    let options = session.config.emit_options();
    let out_dir = args
        .output
        .unwrap_or_else(|| session.config.out_dir.clone());

    let files = match copygen::generate_all(&session.registry, &devices, &options) {
        Ok(files) => files,
        Err(err) => fail_registry(&err, session.registry_path.as_deref()),
    };

    if args.check {
        let mut stale = 0;
        for (path, state) in copygen::check_files(&files, &out_dir) {
            match state {
                Drift::Unchanged => eprintln!("Up to date: {}", path.display()),
                Drift::Missing => {
                    stale += 1;
                    eprintln!("error: missing {}", path.display());
                }
                Drift::Changed { on_disk, generated } => {
                    stale += 1;
                    eprintln!(
                        "error: {} is stale (on disk {}, generated {})",
                        path.display(),
                        on_disk,
                        generated
                    );
                }
            }
        }
        if stale > 0 {
            eprintln!("{} file(s) out of date; run `copygen generate`", stale);
            process::exit(1);
        }
        return;
    }

    match copygen::write_files(&files, &out_dir) {
        Ok(paths) => {
            for (file, path) in files.iter().zip(paths) {
                eprintln!("Generated {} -> {}", file.fingerprint, path.display());
            }
        }
        Err(diag) => {
            diag.render("copygen", None);
            process::exit(1);
        }
    }
}
