use clap::{Parser, Subcommand};
use envdecode::{ByteSize, Config, Decoder, FallbackEnv, FileEnv, OsEnv, docs};
use std::{net::SocketAddr, path::PathBuf, process::ExitCode, time::Duration};
use tracing_subscriber::EnvFilter;

/// Demo service configuration, read from `DEMO_*` variables
#[derive(Debug, Default, Config)]
#[config(prefix = "DEMO_")]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    #[field(default = "127.0.0.1:8080")]
    pub bind_addr: Option<SocketAddr>,

    /// Log filter directive
    #[field(default = "info")]
    pub log_level: String,

    /// Largest accepted request body
    #[field(default = "16MiB")]
    pub upload_limit: ByteSize,

    /// Origins allowed by CORS, comma separated
    pub allowed_origins: Vec<String>,

    #[field(nested)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Default, Config)]
pub struct DatabaseConfig {
    /// Postgres connection string
    #[field(required)]
    pub url: String,

    /// Connection pool size
    #[field(default = "10")]
    pub max_connections: u32,

    /// Per statement timeout
    #[field(default = "30s")]
    pub statement_timeout: Duration,
}

#[derive(Debug, Parser)]
#[command(name = "envdecode-cli", about = "Inspect and check environment based configuration")]
struct Cli {
    /// Env file consulted for variables missing from the process environment
    #[arg(short = 'f', long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode the demo config and print it
    Check {
        /// Fail on DEMO_* variables the config does not read
        #[arg(long)]
        strict: bool,
    },
    /// Write markdown documentation for the demo config
    Docs {
        #[arg(short, long, default_value = "CONFIG.md")]
        output: PathBuf,
    },
    /// Print the variables the demo config reads
    Usage,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { strict } => check(cli.env_file, strict),
        Command::Docs { output } => write_docs(output),
        Command::Usage => print_usage(),
    }
}

fn check(env_file: Option<PathBuf>, strict: bool) -> ExitCode {
    let file_env = match env_file.map(FileEnv::from_path).transpose() {
        Ok(file_env) => file_env.unwrap_or_default(),
        Err(err) => {
            eprintln!("✗ {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = Decoder::new(FallbackEnv::new(OsEnv, file_env))
        .prefix(ServiceConfig::PREFIX)
        .deny_unused(strict)
        .decode::<ServiceConfig>();

    match result {
        Ok(config) => {
            println!("✓ Config loaded successfully!");
            println!("{config:#?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("✗ {err}");
            ExitCode::FAILURE
        }
    }
}

fn write_docs(output: PathBuf) -> ExitCode {
    let written = docs::describe::<ServiceConfig>(ServiceConfig::PREFIX)
        .map_err(|err| err.to_string())
        .and_then(|fields| docs::write_docs(&output, &fields).map_err(|err| err.to_string()));

    match written {
        Ok(()) => {
            println!("✓ Documentation written to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("✗ Failed to write documentation: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() -> ExitCode {
    match docs::describe::<ServiceConfig>(ServiceConfig::PREFIX) {
        Ok(fields) => {
            print!("{}", docs::usage(&fields));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("✗ {err}");
            ExitCode::FAILURE
        }
    }
}
