use tracing_subscriber::{EnvFilter, fmt};
use tracing::{error, info};

use folio::config::{has_flag, ServerConfig, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let cfg = ServerConfig::from_env_and_args(&args);
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "startup",
        "folio starting: RUST_LOG='{}', env={:?}, bind={}, http_port={}, content='{}'",
        rust_log, cfg.environment, cfg.bind, cfg.http_port, cfg.content_path
    );

    // Refuse to serve admin routes without at least one admin.
    let allowlist = match folio::admin::allowlist::init_shared(cfg.production_like()) {
        Ok(al) => al,
        Err(e) => {
            error!(target: "startup", "{}", e);
            return Err(e.into());
        }
    };

    folio::server::run(cfg, allowlist).await
}
