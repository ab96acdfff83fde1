//! Per-connection request loop.
//!
//! Each accepted socket gets one handler task running this loop: read a
//! chunk, feed the frame accumulator, dispatch at most one decoded command,
//! write its response, repeat. Responses therefore come back in request
//! order on every connection.

use std::sync::Arc;

use bytes::BytesMut;
use log::{debug, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_util::sync::CancellationToken;

use crate::{
    command::Response,
    frame::FramedReader,
    router::CommandRouter,
    server::supervisor::ConnectionId,
};

/// Drives one connection until the peer disconnects, a fatal frame or
/// socket error occurs, or the server shuts down.
pub(super) async fn handle(
    id: ConnectionId,
    mut stream: TcpStream,
    router: Arc<CommandRouter>,
    token: CancellationToken,
    recv_buffer: usize,
) {
    let mut reader = FramedReader::new();
    let mut chunk = BytesMut::with_capacity(recv_buffer);

    loop {
        chunk.clear();
        let read = tokio::select! {
            () = token.cancelled() => {
                debug!("shutdown requested, closing connection: id={id}");
                return;
            }
            read = stream.read_buf(&mut chunk) => read,
        };

        match read {
            Ok(0) => {
                info!("peer disconnected: id={id}");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("socket read failed: id={id}, error={e}");
                return;
            }
        }

        let command = match reader.push(&chunk) {
            Ok(Some(command)) => command,
            // Partial payload; keep accumulating.
            Ok(None) => continue,
            Err(e) => {
                warn!("undecodable payload, closing connection: id={id}, error={e}");
                // Best effort: the peer may already be gone.
                let _ = write_response(&mut stream, &Response::error(e.to_string())).await;
                return;
            }
        };

        debug!("dispatching command: id={id}, kind={}", command.kind);
        let response = router.dispatch(&command).await;
        if let Err(e) = write_response(&mut stream, &response).await {
            warn!("response write failed, closing connection: id={id}, error={e}");
            return;
        }
    }
}

async fn write_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    let payload = serde_json::to_vec(response)?;
    stream.write_all(&payload).await?;
    stream.flush().await
}
