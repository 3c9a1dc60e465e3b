//! Shared test utilities.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use callinfo::Invocation;

/// Build a parsed-mode invocation over `args` (script name first) with empty stdin.
pub fn parsed(short: &str, long: &[&str], args: &[&str]) -> Invocation {
    Invocation::builder()
        .short(short)
        .long(long.iter().copied())
        .args(args)
        .stdin(Cursor::new(Vec::new()))
        .build()
        .expect("valid grammar")
}

/// Build a raw-mode invocation over `args` with empty stdin.
pub fn raw(args: &[&str]) -> Invocation {
    Invocation::builder()
        .args(args)
        .stdin(Cursor::new(Vec::new()))
        .build()
        .expect("raw mode never fails")
}

/// Environment map from pairs.
pub fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Reader that yields its content once and fails any read after EOF.
///
/// `reads` counts every call to `read`, so tests can prove the stream
/// was not touched again.
pub struct ReadOnce {
    data: Cursor<Vec<u8>>,
    exhausted: bool,
    pub reads: Arc<AtomicUsize>,
}

impl ReadOnce {
    pub fn new(content: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            data: Cursor::new(content.to_vec()),
            exhausted: false,
            reads: reads.clone(),
        };
        (reader, reads)
    }
}

impl Read for ReadOnce {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.exhausted {
            return Err(io::Error::other("stream drained twice"));
        }
        let n = self.data.read(out)?;
        if n == 0 {
            self.exhausted = true;
        }
        Ok(n)
    }
}

pub fn count(reads: &Arc<AtomicUsize>) -> usize {
    reads.load(Ordering::SeqCst)
}
