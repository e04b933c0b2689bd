//! gRPC Mock Server - CLI Entry Point

use anyhow::Result;
use clap::Parser;
use grpc_mock_server::{Stub, StubRegistry};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "grpc-mock-server",
    about = "gRPC mock server stub engine - validate stub files and dry-run request matching",
    version
)]
struct Args {
    /// Stub file or directory of stub files (JSON or YAML)
    #[arg(short, long, default_value = "stubs")]
    stubs: PathBuf,

    /// Validate stub files and exit
    #[arg(long)]
    validate: bool,

    /// Print an example stub record and exit
    #[arg(long)]
    print_example: bool,

    /// Full method to dry-run a match against, e.g. /helloworld.Greeter/SayHello
    #[arg(long, value_name = "METHOD")]
    method: Option<String>,

    /// Request payload for the dry-run match, inline JSON
    #[arg(long, value_name = "JSON", default_value = "{}", requires = "method")]
    payload: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print an example stub if requested
    if args.print_example {
        println!("{}", serde_json::to_string_pretty(&Stub::example())?);
        return Ok(());
    }

    // Load stubs
    let registry = StubRegistry::new();
    let count = if args.stubs.is_dir() {
        registry.load_dir(&args.stubs).await?
    } else {
        registry.load_file(&args.stubs).await?
    };
    info!(path = %args.stubs.display(), count, "stubs loaded");

    // Validate and exit if requested
    if args.validate {
        println!("Stub files are valid ({count} stubs defined)");
        return Ok(());
    }

    // Dry-run a match if a method was given
    match args.method {
        Some(method) => match registry.find(&method, &args.payload).await {
            Some(stub) => {
                println!("{}", serde_json::to_string_pretty(&stub)?);
                Ok(())
            }
            None => anyhow::bail!("no stub matched {method}"),
        },
        None => {
            println!("Loaded {count} stubs; pass --method/--payload to dry-run a match");
            Ok(())
        }
    }
}
