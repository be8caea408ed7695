//! Byte channels to the remote interpreter.
//!
//! The session only needs blocking reads and writes plus a way to see how much
//! input is waiting. Timeouts are the channel's business: a read that gives up
//! simply returns fewer bytes than requested.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Largest chunk inspected when counting pending input.
const PEEK_BUFFER_SIZE: usize = 4096;

/// A duplex byte stream connected to the interpreter's UART.
pub trait Channel {
    /// Write bytes, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read up to `len` bytes, blocking until they arrive or the channel's own
    /// timeout expires. A short result means the timeout expired.
    fn read(&mut self, len: usize) -> io::Result<Vec<u8>>;

    /// Number of bytes that can be read without blocking.
    fn pending_input_count(&mut self) -> io::Result<usize>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, len: usize) -> io::Result<Vec<u8>> {
        (**self).read(len)
    }

    fn pending_input_count(&mut self) -> io::Result<usize> {
        (**self).pending_input_count()
    }
}

/// A UART exposed over TCP (ser2net, esp-link, or a simulator).
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    /// Connect to a TCP-bridged UART with the given read timeout.
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream, timeout)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, timeout: Duration) -> io::Result<Self> {
        stream.set_read_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(TcpChannel { stream })
    }

    /// Get the underlying stream.
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

impl Channel for TcpChannel {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(data.len())
    }

    fn read(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.stream.read(&mut buf[filled..]) {
                // Peer closed the connection
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    break
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn pending_input_count(&mut self) -> io::Result<usize> {
        let mut buf = [0u8; PEEK_BUFFER_SIZE];
        self.stream.set_nonblocking(true)?;
        let result = self.stream.peek(&mut buf);
        self.stream.set_nonblocking(false)?;
        match result {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }
}
