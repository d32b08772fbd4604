//! Accept loop and dispatcher.

use crate::admission::{PendingQueue, admission_queue};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::handler::handle_connection;
use crate::session::GameSession;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

/// Pause after a failed accept, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// An accepted socket waiting for a handler.
#[derive(Debug)]
pub struct PendingConnection {
    /// The client socket.
    pub stream: TcpStream,
    /// Client address.
    pub peer: SocketAddr,
}

/// A bound gomoku server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    session: Arc<GameSession>,
}

impl Server {
    /// Validates `config` and binds the listening socket.
    #[instrument(skip(config), fields(addr = %config.listen_addr()))]
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let session = Arc::new(GameSession::new(&config));
        info!("Listening");
        Ok(Self {
            listener,
            config: Arc::new(config),
            session,
        })
    }

    /// Address actually bound, useful when the port was 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The shared game.
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// The configuration the server runs with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accepts connections forever.
    ///
    /// Each accepted socket goes through the admission queue; when the queue
    /// is full the socket is closed immediately. A dispatcher task takes
    /// admitted sockets off the queue and spawns one handler each.
    #[instrument(skip(self), fields(capacity = self.config.queue_capacity()))]
    pub async fn run(self) {
        let (admitter, pending) = admission_queue(*self.config.queue_capacity());
        tokio::spawn(dispatch(
            pending,
            Arc::clone(&self.session),
            Arc::clone(&self.config),
        ));

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "Accepted connection");
                    if let Err(rejected) = admitter.try_admit(PendingConnection { stream, peer }) {
                        let PendingConnection { peer, .. } = rejected.into_inner();
                        warn!(%peer, pending = admitter.pending(), "Admission queue full, closing connection");
                    }
                }
                Err(err) => {
                    error!(%err, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

#[instrument(skip_all)]
async fn dispatch(
    mut pending: PendingQueue<PendingConnection>,
    session: Arc<GameSession>,
    config: Arc<ServerConfig>,
) {
    while let Some(PendingConnection { stream, peer }) = pending.dequeue().await {
        debug!(%peer, "Dispatching connection");
        tokio::spawn(handle_connection(
            stream,
            peer,
            Arc::clone(&session),
            Arc::clone(&config),
        ));
    }
    debug!("Admission queue closed");
}
