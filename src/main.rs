mod config;
mod handler;
mod http;
mod logger;
mod server;

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = apply_root_override(config::Config::load()?);

    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the thread pool from config.
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

/// The first positional argument overrides the configured root, so
/// `fileserv /srv/media` works without editing config.toml.
fn apply_root_override(mut cfg: config::Config) -> config::Config {
    if let Some(dir) = std::env::args().nth(1) {
        cfg.files.root = dir;
    }
    cfg
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    // The context is built once and never mutated; the root is
    // canonicalized here so every later containment check compares
    // canonical paths.
    let ctx = Arc::new(config::ServerContext::new(cfg)?);

    logger::log_server_start(&addr, &ctx.root, &ctx.config);

    server::run(listener, ctx).await;
    Ok(())
}
