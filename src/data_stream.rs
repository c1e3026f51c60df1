#[cfg(feature = "secure")]
use openssl::ssl::SslStream;

use std::{
    io::{self, Read, Write},
    net::TcpStream,
    time::Duration,
};

/// Byte stream under the control channel and under each listing transfer.
#[derive(Debug)]
pub enum DataStream {
    Tcp(TcpStream),
    #[cfg(feature = "secure")]
    Ssl(SslStream<TcpStream>),
}

#[cfg(feature = "secure")]
impl DataStream {
    /// Unwrap the stream into a plain TcpStream, dropping any TLS layer.
    pub fn into_tcp_stream(self) -> io::Result<TcpStream> {
        match self {
            DataStream::Tcp(stream) => Ok(stream),
            DataStream::Ssl(stream) => stream.get_ref().try_clone(),
        }
    }

    /// Test if the stream is secured
    pub fn is_ssl(&self) -> bool {
        matches!(self, DataStream::Ssl(_))
    }
}

impl DataStream {
    /// Returns a reference to the underlying TcpStream.
    pub fn get_ref(&self) -> &TcpStream {
        match *self {
            DataStream::Tcp(ref stream) => stream,
            #[cfg(feature = "secure")]
            DataStream::Ssl(ref stream) => stream.get_ref(),
        }
    }

    /// Applies the same timeout to reads and writes on the socket.
    pub fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        let socket = self.get_ref();
        socket.set_read_timeout(timeout)?;
        socket.set_write_timeout(timeout)
    }
}

impl Read for DataStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            DataStream::Tcp(ref mut stream) => stream.read(buf),
            #[cfg(feature = "secure")]
            DataStream::Ssl(ref mut stream) => stream.read(buf),
        }
    }
}

impl Write for DataStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            DataStream::Tcp(ref mut stream) => stream.write(buf),
            #[cfg(feature = "secure")]
            DataStream::Ssl(ref mut stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            DataStream::Tcp(ref mut stream) => stream.flush(),
            #[cfg(feature = "secure")]
            DataStream::Ssl(ref mut stream) => stream.flush(),
        }
    }
}
