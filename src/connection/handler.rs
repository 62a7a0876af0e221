// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a
//! client connection.

use super::guard::ConnectionGuard;
use super::{ClientHandle, SharedWriter};
use crate::core::CadenzaError;
use crate::core::dispatcher::Dispatcher;
use crate::core::protocol;
use crate::core::session::ConnectionId;
use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

/// Manages the full lifecycle of a client connection.
///
/// The read path is deliberately primitive: one `read()` into a fixed-size
/// buffer is treated as one complete command line. There is no reassembly of
/// partial messages; a command split across two reads arrives as two garbled
/// commands. This is a limitation of the wire protocol itself, shared with
/// the clients it serves, not something the handler may quietly paper over.
pub struct ConnectionHandler {
    reader: OwnedReadHalf,
    client: ClientHandle,
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ConnectionHandler {
    /// Creates a new `ConnectionHandler`, splitting the socket so the write
    /// half can be shared with a stream task.
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        connection_id: ConnectionId,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let (reader, writer) = socket.into_split();
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(writer)));
        state.sessions.touch(connection_id);
        Self {
            reader,
            client: ClientHandle {
                id: connection_id,
                writer,
            },
            addr,
            state,
            shutdown_rx,
        }
    }

    /// The main event loop for the connection: wait for a readable line or a
    /// shutdown signal, dispatch, write the reply on the same connection.
    pub async fn run(&mut self) -> Result<(), CadenzaError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.client.id, self.addr);
        let dispatcher = Dispatcher::new(self.state.clone());
        let mut buf = vec![0u8; self.state.config.read_buffer_size];

        loop {
            tokio::select! {
                // Prioritize shutdown over pending reads.
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Connection handler for {} received shutdown signal.", self.addr);
                    break;
                }
                result = self.reader.read(&mut buf) => {
                    match result {
                        Ok(0) => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                        Ok(read) => {
                            let raw = String::from_utf8_lossy(&buf[..read]);
                            let line = raw.trim_end_matches(['\r', '\n']);
                            let command = protocol::parse(line);
                            debug!(
                                "Connection {}: received {:?} command",
                                self.client.id, command.kind
                            );
                            let reply = dispatcher.dispatch(command, &self.client).await;
                            let mut writer = self.client.writer.lock().await;
                            writer.write_all(reply.as_bytes()).await?;
                            writer.flush().await?;
                        }
                        Err(e) => {
                            if is_normal_disconnect(&e) {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Connection error for {}: {}", self.addr, e);
                            }
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    )
}
