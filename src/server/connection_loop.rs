// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling
//! graceful shutdown.

use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// The main server loop that accepts connections and handles graceful
/// shutdown. Returns when a signal arrives or when something sends on the
/// context's shutdown channel; in-flight handlers are woken through the same
/// channel and awaited before the loop returns.
pub async fn run(ctx: ServerContext) {
    let ServerContext {
        state,
        listener,
        shutdown_tx,
    } = ctx;

    let mut connection_counter: u64 = 0;
    let mut client_tasks = JoinSet::new();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown.");
                break;
            }
            _ = shutdown_rx.recv() => {
                info!("Stop requested, initiating graceful shutdown.");
                break;
            }

            res = listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        info!("Accepted new connection from: {}", addr);
                        connection_counter = connection_counter.wrapping_add(1);
                        let connection_id = connection_counter;
                        let state = state.clone();
                        let conn_shutdown_rx = shutdown_tx.subscribe();

                        client_tasks.spawn(async move {
                            let mut handler = ConnectionHandler::new(
                                socket,
                                addr,
                                state,
                                connection_id,
                                conn_shutdown_rx,
                            );
                            if let Err(e) = handler.run().await {
                                warn!("Connection from {} terminated unexpectedly: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res {
                    if e.is_panic() {
                        error!("A client handler panicked: {e:?}");
                    }
                }
            },
        }
    }

    info!("Shutting down. Sending signal to all connection handlers.");
    let _ = shutdown_tx.send(());

    // A stream task in flight observes its stop flag and exits with the
    // handlers.
    state.streaming.stop();

    client_tasks.shutdown().await;
    info!("All client connections closed. Server shutdown complete.");
}
