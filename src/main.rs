use clap::Parser;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = config::Cli::parse();
    let cfg = config::Config::load(&cli)?;
    logger::init(&cfg)?;

    // Worker count comes from config; default is one thread per core
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
    let listener = server::create_listener(addr)?;
    let dispatcher = Arc::new(handler::Dispatcher::new(&cfg)?);

    logger::log_server_start(&addr, &cfg);
    server::run(listener, dispatcher, server::shutdown_signal()).await;
    Ok(())
}
