use std::io;
use std::sync::Arc;

/// A byte-oriented duplex link to one neighbouring unit.
///
/// All operations must return immediately. In particular
/// [`bytes_available`](Channel::bytes_available) has to be truthful and
/// cheap: every task sharing the cooperative scheduler polls it, so a
/// blocking or stale implementation stalls the whole node.
///
/// Methods take `&self` so one channel can be shared between the single
/// writer task and the single reader of a transport. Implementations provide
/// their own interior synchronisation.
pub trait Channel: Send + Sync + 'static {
    /// Number of inbound bytes that can be read without blocking.
    fn bytes_available(&self) -> usize;

    /// Read already-received bytes into `buf`.
    ///
    /// Returns `Ok(0)` when nothing is pending.
    fn read_into(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes to the link, returning how many were accepted.
    fn write(&self, data: &[u8]) -> io::Result<usize>;

    /// Flush any bytes buffered by the implementation.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Discard inbound bytes still held by the channel.
    fn reset_input(&self);
}

impl<C: Channel + ?Sized> Channel for Arc<C> {
    fn bytes_available(&self) -> usize {
        (**self).bytes_available()
    }

    fn read_into(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(buf)
    }

    fn write(&self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }

    fn reset_input(&self) {
        (**self).reset_input()
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn bytes_available(&self) -> usize {
        (**self).bytes_available()
    }

    fn read_into(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(buf)
    }

    fn write(&self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }

    fn reset_input(&self) {
        (**self).reset_input()
    }
}
