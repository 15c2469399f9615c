use crate::errors::Result;
use crate::handlers::SharedSession;
use crate::routes;

use std::path::PathBuf;
use tokio::signal;
use tokio_stream::wrappers::UnixListenerStream;

pub struct Server {
    session: SharedSession,
    socket: PathBuf,
}

impl Server {
    pub fn new(session: SharedSession, socket: PathBuf) -> Server {
        Server { session, socket }
    }

    pub async fn start(&self) -> Result<()> {
        if self.socket.exists() {
            tracing::warn!("Removing stale socket at {}", self.socket.display());
            std::fs::remove_file(&self.socket)?;
        }
        let listener = tokio::net::UnixListener::bind(&self.socket)?;
        tracing::info!("Listening on {}", self.socket.display());
        let incoming = UnixListenerStream::new(listener);
        let server = warp::serve(routes::routes(self.session.clone()))
            .serve_incoming_with_graceful_shutdown(incoming, async {
                if let Err(e) = signal::ctrl_c().await {
                    tracing::error!("Unable to listen for shutdown signal: {}", e);
                }
            });
        server.await;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        tracing::info!("Shutting down server...");
        if self.socket.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket) {
                tracing::error!("Failed to remove socket {}: {}", self.socket.display(), e);
            }
        }
    }
}
