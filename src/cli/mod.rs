pub mod audit;
pub mod generate;
pub mod hash;
pub mod plan;
pub mod types;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, ValueEnum};
use copygen::config::Config;
use copygen::registry::{Device, Registry, RegistryError};

/// Registry and config selection shared by every subcommand.
#[derive(Args)]
pub struct SourceArgs {
    /// Type registry TOML file (default: from copygen.toml, else built-in)
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,
    /// Config file (default: nearest copygen.toml above the working directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    Cpu,
    Cuda,
    All,
}

/// Loaded config plus the registry it (or the command line) selects.
pub struct Session {
    pub config: Config,
    pub registry: Registry,
    pub registry_path: Option<PathBuf>,
}

fn load_config(args: &SourceArgs) -> Config {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path = match &args.config {
        Some(path) => path.clone(),
        None => match Config::find(&cwd) {
            Some(path) => path,
            None => return Config::discover(&cwd).unwrap_or_default(),
        },
    };
    match Config::load(&path) {
        Ok(config) => config,
        Err(diag) => {
            let source = std::fs::read_to_string(&path).ok();
            diag.render(&path.display().to_string(), source.as_deref());
            process::exit(1);
        }
    }
}

/// Load config and registry, or print diagnostics and exit.
pub fn load_session(args: &SourceArgs) -> Session {
    let config = load_config(args);
    let registry_path = args.registry.clone().or_else(|| config.registry.clone());
    let registry = match copygen::load_registry(registry_path.as_deref()) {
        Ok(registry) => registry,
        Err(err) => fail_registry(&err, registry_path.as_deref()),
    };
    Session {
        config,
        registry,
        registry_path,
    }
}

/// Backends selected by `--backend`, falling back to the config.
pub fn resolve_devices(arg: Option<BackendArg>, config: &Config) -> Vec<Device> {
    match arg {
        Some(BackendArg::Cpu) => vec![Device::Cpu],
        Some(BackendArg::Cuda) => vec![Device::Cuda],
        Some(BackendArg::All) => Device::ALL.to_vec(),
        None => config.backends.clone(),
    }
}

pub fn fail_registry(err: &RegistryError, registry_path: Option<&Path>) -> ! {
    copygen::render_registry_error(err, registry_path);
    process::exit(1);
}
