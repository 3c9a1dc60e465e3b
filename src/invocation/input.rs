//! Lazily drained, cached standard input.
//!
//! ```text
//! Uninitialized ──first successful read──▶ Cached
//! ```
//!
//! The pending reader sits behind a mutex so at most one caller drains it;
//! the bytes land in a `OnceLock` and every later call borrows them.
//!
//! A failed read keeps the reader and every byte read so far, so a later
//! call resumes where it stopped instead of starting over.

use std::io::{self, Read};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::invocation::error::InvocationError;

/// Any blocking byte stream standing in for stdin.
pub type InputStream = Box<dyn Read + Send>;

enum Pending {
    /// Not drained yet. `partial` holds bytes read before an earlier error.
    Reader {
        reader: InputStream,
        partial: Vec<u8>,
    },
    /// Handed to a background thread by [`LazyInput::get_timeout`].
    InFlight(Receiver<Drain>),
    /// The background reader died without handing the stream back.
    Lost,
    /// Drained; the cache is set.
    Drained,
}

/// What the background thread hands back: the stream, the bytes, the outcome.
struct Drain {
    reader: InputStream,
    buf: Vec<u8>,
    result: io::Result<()>,
}

/// Single-flight, read-once wrapper around an input stream.
pub struct LazyInput {
    pending: Mutex<Pending>,
    cache: OnceLock<Vec<u8>>,
}

impl LazyInput {
    pub fn new(reader: InputStream) -> Self {
        Self {
            pending: Mutex::new(Pending::Reader {
                reader,
                partial: Vec::new(),
            }),
            cache: OnceLock::new(),
        }
    }

    /// Whether the stream has already been drained.
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Drain the stream on first call, then return the cached bytes.
    ///
    /// Blocks until end-of-stream. On an interactive terminal with no EOF
    /// pending this never returns. On a read error the bytes read so far are
    /// kept and the next call continues from there.
    pub fn get(&self) -> Result<&[u8], InvocationError> {
        if let Some(bytes) = self.cache.get() {
            return Ok(bytes);
        }

        let mut pending = self.pending.lock();
        match &mut *pending {
            Pending::Drained | Pending::Lost => self.cached(),
            Pending::Reader { reader, partial } => {
                debug!(resumed_at = partial.len(), "draining standard input");
                match reader.read_to_end(partial) {
                    Ok(_) => {
                        let bytes = std::mem::take(partial);
                        Ok(self.store(&mut pending, bytes))
                    }
                    Err(e) => {
                        debug!(kept = partial.len(), error = %e, "standard input read failed");
                        Err(InvocationError::Input(e))
                    }
                }
            }
            Pending::InFlight(rx) => match rx.recv() {
                Ok(drain) => self.settle(&mut pending, drain),
                Err(_) => {
                    *pending = Pending::Lost;
                    Err(InvocationError::InputLost)
                }
            },
        }
    }

    /// Like [`get`](Self::get), but gives up after `timeout`.
    ///
    /// The budget covers both waiting for another caller's read and the read
    /// itself. The read moves to a background thread; on timeout it keeps
    /// running and a later call picks up its result, so the stream is still
    /// read once. If the background read fails, the stream and the bytes read
    /// so far come back and a later call resumes the drain.
    pub fn get_timeout(&self, timeout: Duration) -> Result<&[u8], InvocationError> {
        if let Some(bytes) = self.cache.get() {
            return Ok(bytes);
        }

        let deadline = Instant::now() + timeout;
        let Some(mut pending) = self.pending.try_lock_for(timeout) else {
            debug!(?timeout, "standard input busy in another caller");
            return Err(InvocationError::InputTimedOut(timeout));
        };
        if let Some(bytes) = self.cache.get() {
            return Ok(bytes);
        }

        let state = std::mem::replace(&mut *pending, Pending::Lost);
        match launch(state) {
            Ok(next) => *pending = next,
            Err((restored, e)) => {
                *pending = restored;
                return Err(InvocationError::Input(e));
            }
        }

        let Pending::InFlight(rx) = &*pending else {
            return self.cached();
        };
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(drain) => self.settle(&mut pending, drain),
            Err(RecvTimeoutError::Timeout) => {
                debug!(?timeout, "standard input not drained in time");
                Err(InvocationError::InputTimedOut(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                *pending = Pending::Lost;
                Err(InvocationError::InputLost)
            }
        }
    }

    /// Cache a finished background drain, or put the stream back for a retry.
    fn settle(&self, pending: &mut Pending, drain: Drain) -> Result<&[u8], InvocationError> {
        match drain.result {
            Ok(()) => Ok(self.store(pending, drain.buf)),
            Err(e) => {
                debug!(kept = drain.buf.len(), error = %e, "background standard input read failed");
                *pending = Pending::Reader {
                    reader: drain.reader,
                    partial: drain.buf,
                };
                Err(InvocationError::Input(e))
            }
        }
    }

    fn store(&self, pending: &mut Pending, bytes: Vec<u8>) -> &[u8] {
        trace!(len = bytes.len(), "standard input cached");
        *pending = Pending::Drained;
        self.cache.get_or_init(|| bytes)
    }

    fn cached(&self) -> Result<&[u8], InvocationError> {
        self.cache
            .get()
            .map(Vec::as_slice)
            .ok_or(InvocationError::InputLost)
    }
}

impl std::fmt::Debug for LazyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyInput")
            .field("cached", &self.is_cached())
            .finish()
    }
}

/// Move a pending reader onto a background thread; other states pass through.
///
/// On failure the original state comes back with the error.
fn launch(state: Pending) -> Result<Pending, (Pending, io::Error)> {
    match state {
        Pending::Reader { reader, partial } => spawn_reader(reader, partial)
            .map(Pending::InFlight)
            .map_err(|(e, reader, partial)| (Pending::Reader { reader, partial }, e)),
        other => Ok(other),
    }
}

type SpawnFailure = (io::Error, InputStream, Vec<u8>);

/// Start the reader thread, then hand it the stream.
///
/// The stream only crosses over once the thread is running, so a failed
/// spawn returns it untouched.
fn spawn_reader(reader: InputStream, partial: Vec<u8>) -> Result<Receiver<Drain>, SpawnFailure> {
    let (job_tx, job_rx) = sync_channel::<(InputStream, Vec<u8>)>(1);
    let (tx, rx) = sync_channel(1);

    let spawned = thread::Builder::new()
        .name("callinfo-stdin".into())
        .spawn(move || {
            let Ok((mut reader, mut buf)) = job_rx.recv() else {
                return;
            };
            let result = reader.read_to_end(&mut buf).map(|_| ());
            let _ = tx.send(Drain {
                reader,
                buf,
                result,
            });
        });

    if let Err(e) = spawned {
        return Err((e, reader, partial));
    }
    job_tx.send((reader, partial)).map_err(|err| {
        let (reader, partial) = err.0;
        (
            io::Error::other("standard input reader thread exited early"),
            reader,
            partial,
        )
    })?;
    Ok(rx)
}
