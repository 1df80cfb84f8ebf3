use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ChannelError, Result};
use crate::traits::Channel;

const DRAIN_CHUNK_SIZE: usize = 256;

/// A [`Channel`] over a non-blocking Unix domain socket.
///
/// Lets host-side emulators stand in for a serial link: two processes (or
/// two tasks) exchange exactly the byte stream a UART would carry.
#[derive(Debug)]
pub struct UnixChannel {
    stream: UnixStream,
}

impl UnixChannel {
    /// Create a connected pair of channels.
    pub fn pair() -> Result<(Self, Self)> {
        let (left, right) = UnixStream::pair()?;
        Ok((Self::from_stream(left)?, Self::from_stream(right)?))
    }

    /// Connect to a listening Unix domain socket.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| ChannelError::Connect {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(?path, "connected unix channel");
        Self::from_stream(stream)
    }

    /// Wrap an existing stream, switching it to non-blocking mode.
    pub fn from_stream(stream: UnixStream) -> Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream })
    }

    fn pending_bytes(&self) -> std::io::Result<usize> {
        let fd = self.stream.as_raw_fd();
        let mut pending: libc::c_int = 0;

        // SAFETY: `fd` is an open socket owned by `self.stream`, and `pending` is
        // a valid writable c_int as FIONREAD requires.
        let rc = unsafe { libc::ioctl(fd, libc::FIONREAD, &mut pending as *mut libc::c_int) };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(usize::try_from(pending).unwrap_or(0))
    }
}

impl Channel for UnixChannel {
    fn bytes_available(&self) -> usize {
        match self.pending_bytes() {
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "FIONREAD failed on unix channel");
                0
            }
        }
    }

    fn read_into(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        match (&self.stream).read(buf) {
            Ok(n) => Ok(n),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(err) => Err(err),
        }
    }

    fn write(&self, data: &[u8]) -> std::io::Result<usize> {
        (&self.stream).write(data)
    }

    fn flush(&self) -> std::io::Result<()> {
        (&self.stream).flush()
    }

    fn reset_input(&self) {
        let mut scratch = [0u8; DRAIN_CHUNK_SIZE];
        loop {
            match (&self.stream).read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for_bytes(channel: &UnixChannel, expected: usize) {
        for _ in 0..200 {
            if channel.bytes_available() >= expected {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("bytes did not arrive");
    }

    #[test]
    fn pair_roundtrip() {
        let (left, right) = UnixChannel::pair().unwrap();

        assert_eq!(left.write(b"hello").unwrap(), 5);
        wait_for_bytes(&right, 5);

        let mut buf = [0u8; 16];
        let n = right.read_into(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn read_without_data_returns_zero() {
        let (_left, right) = UnixChannel::pair().unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(right.bytes_available(), 0);
        assert_eq!(right.read_into(&mut buf).unwrap(), 0);
    }

    #[test]
    fn reset_input_drains_pending_bytes() {
        let (left, right) = UnixChannel::pair().unwrap();
        left.write(&[7u8; 100]).unwrap();
        wait_for_bytes(&right, 100);

        right.reset_input();
        assert_eq!(right.bytes_available(), 0);
    }

    #[test]
    fn connect_to_missing_path_fails() {
        let missing = std::env::temp_dir().join(format!(
            "daisylink-missing-{}.sock",
            std::process::id()
        ));
        let err = UnixChannel::connect(&missing).unwrap_err();
        assert!(matches!(err, ChannelError::Connect { .. }));
    }
}
