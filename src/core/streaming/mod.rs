// src/core/streaming/mod.rs

//! Coordinates audio streaming over the connections' shared write halves.
//!
//! One stream runs at a time, server-wide: an explicit single slot guarded by
//! a mutex, not a task pool. A `play` while the slot is occupied is rejected
//! with a busy reply rather than displacing the running stream.
//!
//! Control replies and audio bytes share one connection with no framing
//! between them. After a `play` reply, the client's next read is the JSON
//! format-description message and every read after that is audio until the
//! literal `END` sentinel (natural completion) or until the client's own
//! `stop` reply arrives racing the remaining chunks. A cleaner design would
//! use a separate data channel or length-prefixed frames; this interleaving
//! is the contract existing clients depend on, so it stays.

mod format;
mod library;

pub use format::{AudioEncoding, AudioFormat, read_wav_format};
pub use library::{AudioLibrary, AudioSource, FsAudioLibrary};

use crate::connection::SharedWriter;
use crate::core::CadenzaError;
use crate::core::catalog::Song;
use crate::core::session::{ConnectionId, ProtocolMode, SessionRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

/// In-band sentinel written as the final bytes of a naturally completed
/// stream. An explicitly stopped stream sends nothing extra.
pub const END_OF_STREAM: &str = "END";

/// How a stream task left the `Streaming` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The audio source was exhausted; the sentinel was sent.
    Finished,
    /// The stop flag was observed; no sentinel was sent.
    Stopped,
}

/// The occupant of the global stream slot.
#[derive(Debug, Clone)]
pub struct ActiveStream {
    pub id: u64,
    pub connection: ConnectionId,
    pub song_name: String,
    pub singer: String,
    stop: Arc<AtomicBool>,
}

/// A reserved slot, handed back to [`StreamingCoordinator::spawn`] once the
/// play-count side effects have succeeded, or returned via
/// [`StreamingCoordinator::release`] if they did not.
pub struct StreamTicket {
    id: u64,
    connection: ConnectionId,
    stop: Arc<AtomicBool>,
}

/// Owns the single stream slot and the tasks that fill it.
pub struct StreamingCoordinator {
    library: Arc<dyn AudioLibrary>,
    sessions: Arc<SessionRegistry>,
    slot: Mutex<Option<ActiveStream>>,
    next_stream_id: AtomicU64,
    chunk_size: usize,
    chunk_pause: Duration,
}

impl StreamingCoordinator {
    pub fn new(
        library: Arc<dyn AudioLibrary>,
        sessions: Arc<SessionRegistry>,
        chunk_size: usize,
        chunk_pause: Duration,
    ) -> Self {
        Self {
            library,
            sessions,
            slot: Mutex::new(None),
            next_stream_id: AtomicU64::new(0),
            chunk_size,
            chunk_pause,
        }
    }

    /// Claims the stream slot for a connection. Fails with `StreamBusy` while
    /// another stream occupies it.
    pub fn try_reserve(
        &self,
        connection: ConnectionId,
        song: &Song,
    ) -> Result<StreamTicket, CadenzaError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(CadenzaError::StreamBusy);
        }
        let id = self.next_stream_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stop = Arc::new(AtomicBool::new(false));
        *slot = Some(ActiveStream {
            id,
            connection,
            song_name: song.name.clone(),
            singer: song.singer.clone(),
            stop: stop.clone(),
        });
        Ok(StreamTicket {
            id,
            connection,
            stop,
        })
    }

    /// Returns a reserved slot without ever having streamed. Used when the
    /// side effects between reservation and spawn fail.
    pub fn release(&self, ticket: StreamTicket) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|s| s.id == ticket.id) {
            *slot = None;
        }
    }

    /// Starts the stream task for a reserved slot and flips the session's
    /// protocol mode to `Streaming`.
    pub fn spawn(self: &Arc<Self>, ticket: StreamTicket, song: Song, writer: SharedWriter) {
        self.sessions
            .set_mode(ticket.connection, ProtocolMode::Streaming);
        let coordinator = self.clone();
        tokio::spawn(async move {
            match coordinator.run_stream(&ticket, &song, writer).await {
                Ok(outcome) => {
                    debug!(
                        "Stream {} of {} ended: {:?}",
                        ticket.id, song.name, outcome
                    );
                }
                Err(e) => {
                    warn!("Stream {} of {} aborted: {}", ticket.id, song.name, e);
                }
            }
            coordinator.finish(&ticket);
        });
    }

    /// Flips the stop flag of whatever stream currently occupies the slot.
    /// Returns whether a stream was there to be stopped; stopping an empty
    /// slot is a no-op, not an error.
    pub fn stop(&self) -> bool {
        match self.slot.lock().as_ref() {
            Some(stream) => {
                stream.stop.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Cooperatively stops the stream owned by a disconnecting connection.
    /// The task also exits on its first failed write to the dead socket.
    pub fn release_for(&self, connection: ConnectionId) {
        if let Some(stream) = self.slot.lock().as_ref() {
            if stream.connection == connection {
                stream.stop.store(true, Ordering::Release);
            }
        }
    }

    /// A snapshot of the current slot occupant, if any.
    pub fn current(&self) -> Option<ActiveStream> {
        self.slot.lock().clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// The stream task body: format message first, then paced fixed-size
    /// chunks until exhaustion or the stop flag, then the sentinel only on
    /// natural completion.
    async fn run_stream(
        &self,
        ticket: &StreamTicket,
        song: &Song,
        writer: SharedWriter,
    ) -> Result<StreamOutcome, CadenzaError> {
        let AudioSource { format, mut reader } = self.library.open(song).await?;

        let header = serde_json::to_vec(&format)?;
        writer.lock().await.write_all(&header).await?;

        let mut buf = vec![0u8; self.chunk_size];
        loop {
            if ticket.stop.load(Ordering::Acquire) {
                return Ok(StreamOutcome::Stopped);
            }
            let read = reader.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            writer.lock().await.write_all(&buf[..read]).await?;
            tokio::time::sleep(self.chunk_pause).await;
        }

        // A stop that lands between the last chunk and here still suppresses
        // the sentinel.
        if ticket.stop.load(Ordering::Acquire) {
            return Ok(StreamOutcome::Stopped);
        }
        writer
            .lock()
            .await
            .write_all(END_OF_STREAM.as_bytes())
            .await?;
        Ok(StreamOutcome::Finished)
    }

    /// Clears the slot (if this task still owns it) and restores the
    /// session's protocol mode.
    fn finish(&self, ticket: &StreamTicket) {
        {
            let mut slot = self.slot.lock();
            if slot.as_ref().is_some_and(|s| s.id == ticket.id) {
                *slot = None;
            }
        }
        self.sessions
            .set_mode(ticket.connection, ProtocolMode::Idle);
    }
}
