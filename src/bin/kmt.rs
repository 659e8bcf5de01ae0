//!
//! kmt CLI binary
//! --------------
//! Logs in to the HR backend, keeps the session in a file between invocations and
//! prints departments, users and leave requests as tables.

use anyhow::Result;
use clap::Parser;

use kmt_hr::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default; RUST_LOG=kmt=debug shows every request
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Cli::parse();
    let out = cli::run(args).await?;
    println!("{}", out);
    Ok(())
}
