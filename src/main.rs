use std::sync::Arc;
use tokio::sync::Notify;

use calendar_server::config::{AppState, Config};
use calendar_server::logger;
use calendar_server::server::{
    acceptor_from_config, create_reusable_listener, start_server_loop, start_signal_handler,
};
use calendar_server::store::EventStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Config::path_from_args(std::env::args());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = EventStore::open(&cfg.storage.data_path).await?;
    logger::log_store_opened(store.path(), store.len().await);

    let state = Arc::new(AppState::new(cfg, Arc::new(store))?);
    logger::log_info(&format!("[Router] {} API routes registered", state.router.len()));
    let tls = acceptor_from_config(&state.config.server);
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &state.config, tls.is_some());

    let shutdown = Arc::new(Notify::new());
    start_signal_handler(Arc::clone(&shutdown));
    start_server_loop(listener, state, tls, shutdown).await;

    Ok(())
}
