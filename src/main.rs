use docroot::config::Config;
use docroot::logging;
use docroot::server::Server;

fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    logging::init(&cfg.logging)?;

    let server = Server::new(cfg);
    server.start_non_blocking()?;
    let mut running = server.watch_running();

    let signals = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    signals.block_on(async {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("Shutdown signal received");
            }

            _ = running.wait_for(|running| !*running) => {
                tracing::error!("Server exited unexpectedly");
            }
        }
        anyhow::Ok(())
    })?;

    server.stop();
    Ok(())
}

