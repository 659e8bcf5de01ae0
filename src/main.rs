use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

use kmt_hr::mock::{DEFAULT_PORT, PORT_ENV};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let port = match std::env::var(PORT_ENV) {
        Ok(v) => v.trim().parse::<u16>().map_err(|e| anyhow::anyhow!("{}='{}' is not a port: {}", PORT_ENV, v, e))?,
        Err(_) => DEFAULT_PORT,
    };
    info!(target: "kmt", "kmt mock backend starting: RUST_LOG='{}', port={}", rust_log, port);

    kmt_hr::mock::run(port).await
}
