use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tools::{Args, run};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Args::parse()).await {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
