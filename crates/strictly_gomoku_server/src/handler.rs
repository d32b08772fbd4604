//! Per-connection task.
//!
//! Each accepted socket is split in two. The read half feeds a
//! [`MoveCodec`] and submits decoded moves to the shared [`GameSession`].
//! The write half belongs to a writer task that drains the connection's
//! outbound channel, so socket writes never happen under the board lock.

use crate::config::ServerConfig;
use crate::error::ConnectionError;
use crate::protocol::MoveCodec;
use crate::registry::{ConnectionId, Registration};
use crate::session::GameSession;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::codec::{BytesCodec, FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

/// How long a closing connection may spend flushing queued messages.
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// Serves one client until it disconnects or misbehaves.
///
/// Never returns an error: every failure is logged and confined to this
/// connection.
#[instrument(skip_all, fields(%peer))]
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    session: Arc<GameSession>,
    config: Arc<ServerConfig>,
) {
    debug!("Serving connection");
    match serve_connection(stream, peer, &session, &config).await {
        Ok(()) => info!("Client disconnected"),
        Err(ConnectionError::Protocol(err)) => {
            warn!(%err, "Closing connection after malformed message")
        }
        Err(err) => warn!(%err, "Connection closed"),
    }
}

enum Finished {
    Reader(Result<(), ConnectionError>),
    Writer(Result<io::Result<()>, JoinError>),
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    session: &GameSession,
    config: &ServerConfig,
) -> Result<(), ConnectionError> {
    let (read_half, write_half) = stream.into_split();
    let (outbound, rx) = mpsc::channel(*config.outbound_buffer());
    let registration = Registration::new(session.registry().clone(), peer, outbound);
    let id = registration.id();

    let mut writer = tokio::spawn(write_loop(write_half, rx));
    let mut frames = FramedRead::with_capacity(
        read_half,
        MoveCodec::new(*config.max_message_len()),
        *config.read_buffer_size(),
    );

    let finished = tokio::select! {
        read = read_loop(&mut frames, id, session, config.idle_timeout()) => Finished::Reader(read),
        written = &mut writer => Finished::Writer(written),
    };

    // Leaving the registry drops the outbound sender, which lets the writer
    // drain and shut the socket down.
    drop(registration);

    match finished {
        Finished::Reader(result) => {
            finish_writer(writer).await;
            result
        }
        Finished::Writer(Ok(Ok(()))) => Err(ConnectionError::Stalled),
        Finished::Writer(Ok(Err(err))) => Err(err.into()),
        Finished::Writer(Err(err)) => Err(io::Error::other(err).into()),
    }
}

async fn read_loop(
    frames: &mut FramedRead<OwnedReadHalf, MoveCodec>,
    id: ConnectionId,
    session: &GameSession,
    idle: Option<Duration>,
) -> Result<(), ConnectionError> {
    loop {
        let next = match idle {
            Some(limit) => tokio::time::timeout(limit, frames.next())
                .await
                .map_err(|_| ConnectionError::IdleTimeout)?,
            None => frames.next().await,
        };
        let Some(frame) = next else {
            return Ok(());
        };
        if let Err(err) = session.submit(id, frame?) {
            debug!(id, %err, "Move not applied");
        }
    }
}

async fn write_loop(
    write_half: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Bytes>,
) -> io::Result<()> {
    let mut sink = FramedWrite::new(write_half, BytesCodec::new());
    while let Some(message) = outbound.recv().await {
        sink.send(message).await?;
    }
    // `BytesCodec` sinks both `Bytes` and `BytesMut`.
    SinkExt::<Bytes>::close(&mut sink).await
}

async fn finish_writer(mut writer: JoinHandle<io::Result<()>>) {
    match tokio::time::timeout(WRITER_GRACE, &mut writer).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(err))) => debug!(%err, "Flush on close failed"),
        Ok(Err(err)) => warn!(%err, "Writer task failed"),
        Err(_) => {
            warn!("Writer did not finish in time, aborting");
            writer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(
            TcpStream::connect(addr),
            listener.accept()
        );
        (client.unwrap(), accepted.unwrap().0)
    }

    #[tokio::test]
    async fn test_write_loop_flushes_queue_then_closes() {
        let (mut client, server) = socket_pair().await;
        let (_read_half, write_half) = server.into_split();
        let (tx, rx) = mpsc::channel(4);

        tx.send(Bytes::from_static(b"X,-,\n")).await.unwrap();
        tx.send(Bytes::from_static(b"WINX\n")).await.unwrap();
        drop(tx);

        write_loop(write_half, rx).await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"X,-,\nWINX\n");
    }
}
