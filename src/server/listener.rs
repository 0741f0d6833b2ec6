use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn, Instrument};

use crate::http::connection::Connection;
use crate::static_files::Router;

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Accepts connections until `shutdown` fires or its sender is dropped.
///
/// Each accepted socket is handed to its own task before the loop goes
/// back to accepting, so a slow connection never delays the next accept.
pub async fn run(
    listener: TcpListener,
    router: Arc<Router>,
    read_timeout: Option<Duration>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Acceptor closed");
                break;
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        info!("Accepted connection from {}", peer);

                        let conn = Connection::new(socket, router.clone(), read_timeout);
                        tokio::spawn(
                            async move {
                                if let Err(e) = conn.run().await {
                                    tracing::error!("Connection error from {}: {:#}", peer, e);
                                }
                            }
                            .instrument(tracing::info_span!("connection", %peer)),
                        );
                    }
                    Err(e) => {
                        warn!(error = %e, "Accept error");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }
    }

    Ok(())
}
