use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime; workers config pins the thread count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Bind failure is fatal: log it and abort startup, no retry
    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
        e
    })?;

    let state = Arc::new(config::AppState::new(cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &state.config);

    let signals = Arc::new(server::signal::SignalHandler::new());
    server::signal::start_signal_handler(Arc::clone(&signals));

    server::run_accept_loop(listener, state, active_connections, signals).await;
    Ok(())
}
