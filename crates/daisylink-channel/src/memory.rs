use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Buf, BytesMut};

use crate::traits::Channel;

#[derive(Debug, Default)]
struct Pipe {
    buf: BytesMut,
    closed: bool,
}

/// One end of an in-process duplex byte pipe.
///
/// Bytes written to one end become readable on the other. Used by tests and
/// by host-side emulation of a daisy chain.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    inbound: Arc<Mutex<Pipe>>,
    outbound: Arc<Mutex<Pipe>>,
}

impl MemoryChannel {
    /// Create two connected ends.
    pub fn pair() -> (Self, Self) {
        let a_to_b = Arc::new(Mutex::new(Pipe::default()));
        let b_to_a = Arc::new(Mutex::new(Pipe::default()));
        let a = Self {
            inbound: Arc::clone(&b_to_a),
            outbound: Arc::clone(&a_to_b),
        };
        let b = Self {
            inbound: a_to_b,
            outbound: b_to_a,
        };
        (a, b)
    }

    /// Make `data` readable on this end as if the peer had sent it.
    ///
    /// Useful for simulating line noise or a misbehaving neighbour.
    pub fn inject(&self, data: &[u8]) {
        lock(&self.inbound).buf.extend_from_slice(data);
    }

    /// Mark this end as closed; further writes from the peer fail.
    pub fn close(&self) {
        lock(&self.inbound).closed = true;
        lock(&self.outbound).closed = true;
    }
}

fn lock(pipe: &Mutex<Pipe>) -> MutexGuard<'_, Pipe> {
    pipe.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Channel for MemoryChannel {
    fn bytes_available(&self) -> usize {
        lock(&self.inbound).buf.len()
    }

    fn read_into(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut pipe = lock(&self.inbound);
        let n = pipe.buf.len().min(buf.len());
        buf[..n].copy_from_slice(&pipe.buf[..n]);
        pipe.buf.advance(n);
        Ok(n)
    }

    fn write(&self, data: &[u8]) -> io::Result<usize> {
        let mut pipe = lock(&self.outbound);
        if pipe.closed {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        pipe.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn reset_input(&self) {
        lock(&self.inbound).buf.clear();
    }
}
