use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;

use kvorm_http::ServerConfig;

/// kvorm - replay REST requests against an in-memory record server
#[derive(Parser, Debug)]
#[command(name = "kvorm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Storage key namespace (overrides config and KVORM_NAMESPACE)
    #[arg(long)]
    namespace: Option<String>,

    /// Request path prefix (overrides config and KVORM_PATH_PREFIX)
    #[arg(long)]
    prefix: Option<String>,

    /// Request script; reads stdin when omitted
    script: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Config(#[from] kvorm_core::Error),

    #[error("cannot open script '{path}': {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Run(#[from] kvorm_cli::ScriptError),
}

fn load_config(args: &Args) -> Result<ServerConfig, kvorm_core::Error> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_json_file(path)?,
        None => ServerConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.path_prefix = Some(prefix.clone());
    }
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    tracing::info!(namespace = %config.namespace, prefix = ?config.path_prefix, "starting");

    let server = kvorm_cli::demo_server(config)?;
    let stdout = io::stdout().lock();

    let sent = match &args.script {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Script {
                path: path.clone(),
                source,
            })?;
            kvorm_cli::run_script(&server, BufReader::new(file), stdout)?
        }
        None => kvorm_cli::run_script(&server, io::stdin().lock(), stdout)?,
    };

    tracing::info!(requests = sent, "script finished");
    server.close();
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvorm=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
