//! FTP module.

use std::borrow::Cow;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "secure")]
use openssl::ssl::{Ssl, SslContext};
use regex::Regex;

use super::data_stream::DataStream;
use super::status;
use super::types::{FtpError, Line, Result};

lazy_static! {
    // This regex extracts IP and Port details from PASV command response.
    // The regex looks for the pattern (h1,h2,h3,h4,p1,p2).
    static ref PORT_RE: Regex = Regex::new(r"\((\d+),(\d+),(\d+),(\d+),(\d+),(\d+)\)").unwrap();
}

/// Stream to interface with the FTP server. This interface is only for the command stream.
#[derive(Debug)]
pub struct FtpStream {
    reader: BufReader<DataStream>,
    timeout: Option<Duration>,
    #[cfg(feature = "secure")]
    ssl_cfg: Option<SslContext>,
}

impl FtpStream {
    /// Creates an FTP Stream and waits for the server greeting.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<FtpStream> {
        let stream = TcpStream::connect(addr)?;
        let mut ftp_stream = FtpStream::over(DataStream::Tcp(stream));
        ftp_stream.read_response(status::READY)?;
        Ok(ftp_stream)
    }

    fn over(stream: DataStream) -> FtpStream {
        FtpStream {
            reader: BufReader::new(stream),
            timeout: None,
            #[cfg(feature = "secure")]
            ssl_cfg: None,
        }
    }

    /// Switch to a secure mode if possible, using a provided SSL configuration.
    ///
    /// ## Example
    ///
    /// ```rust,no_run
    /// use ftp_directory::FtpStream;
    /// use openssl::ssl::{SslConnector, SslMethod};
    ///
    /// let ctx = SslConnector::builder(SslMethod::tls()).unwrap().build().into_context();
    /// let ftp_stream = FtpStream::connect("127.0.0.1:21").unwrap();
    /// let mut ftp_stream = ftp_stream.into_secure(ctx).unwrap();
    /// let _ = ftp_stream.quit();
    /// ```
    #[cfg(feature = "secure")]
    pub fn into_secure(mut self, ssl_context: SslContext) -> Result<FtpStream> {
        // Ask the server to start securing data.
        self.write_str("AUTH TLS\r\n")?;
        self.read_response(status::AUTH_OK)?;
        let ssl = Ssl::new(&ssl_context).map_err(|e| FtpError::SecureError(e.to_string()))?;
        let tcp = self.reader.into_inner().into_tcp_stream()?;
        let stream = ssl
            .connect(tcp)
            .map_err(|e| FtpError::SecureError(e.to_string()))?;

        let mut secured = FtpStream {
            reader: BufReader::new(DataStream::Ssl(stream)),
            timeout: self.timeout,
            ssl_cfg: Some(ssl_context),
        };
        // Set protection buffer size
        secured.write_str("PBSZ 0\r\n")?;
        secured.read_response(status::COMMAND_OK)?;
        // Change the level of data protection to Private
        secured.write_str("PROT P\r\n")?;
        secured.read_response(status::COMMAND_OK)?;
        Ok(secured)
    }

    /// Switch to insecure mode. If the connection is already
    /// insecure does nothing.
    #[cfg(feature = "secure")]
    pub fn into_insecure(mut self) -> Result<FtpStream> {
        if !self.reader.get_ref().is_ssl() {
            return Ok(self);
        }
        // Ask the server to stop securing data
        self.write_str("CCC\r\n")?;
        self.read_response(status::COMMAND_OK)?;
        let tcp = self.reader.into_inner().into_tcp_stream()?;
        let mut plain = FtpStream::over(DataStream::Tcp(tcp));
        plain.timeout = self.timeout;
        Ok(plain)
    }

    /// Execute command which send data back in a separate stream
    fn data_command(&mut self, cmd: &str) -> Result<DataStream> {
        let addr = self.pasv()?;
        self.write_str(cmd)?;
        let stream = TcpStream::connect(addr)?;
        let stream = self.wrap_data_stream(stream)?;
        stream.set_timeout(self.timeout)?;
        Ok(stream)
    }

    #[cfg(not(feature = "secure"))]
    fn wrap_data_stream(&self, stream: TcpStream) -> Result<DataStream> {
        Ok(DataStream::Tcp(stream))
    }

    #[cfg(feature = "secure")]
    fn wrap_data_stream(&self, stream: TcpStream) -> Result<DataStream> {
        match self.ssl_cfg {
            Some(ref ctx) => Ssl::new(ctx)
                .map_err(|e| FtpError::SecureError(e.to_string()))?
                .connect(stream)
                .map(DataStream::Ssl)
                .map_err(|e| FtpError::SecureError(e.to_string())),
            None => Ok(DataStream::Tcp(stream)),
        }
    }

    /// Returns a reference to the underlying TcpStream.
    pub fn get_ref(&self) -> &TcpStream {
        self.reader.get_ref().get_ref()
    }

    /// Sets read and write timeouts on the control channel and on every
    /// data channel opened afterwards. `None` blocks indefinitely.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_timeout(timeout)?;
        self.timeout = timeout;
        Ok(())
    }

    /// Log in to the FTP server.
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        self.write_str(format!("USER {}\r\n", user))?;
        let Line(code, _) = self.read_response_in(&[status::LOGGED_IN, status::NEED_PASSWORD])?;
        if code == status::NEED_PASSWORD {
            self.write_str(format!("PASS {}\r\n", password))?;
            self.read_response(status::LOGGED_IN)?;
        }
        Ok(())
    }

    /// Change the current directory to the path specified.
    pub fn cwd(&mut self, path: &str) -> Result<()> {
        self.write_str(format!("CWD {}\r\n", path))?;
        self.read_response(status::REQUESTED_FILE_ACTION_OK).map(|_| ())
    }

    /// Move the current directory to the parent directory.
    pub fn cdup(&mut self) -> Result<()> {
        self.write_str("CDUP\r\n")?;
        self.read_response_in(&[status::COMMAND_OK, status::REQUESTED_FILE_ACTION_OK])
            .map(|_| ())
    }

    /// Gets the current directory
    pub fn pwd(&mut self) -> Result<String> {
        self.write_str("PWD\r\n")?;
        let Line(_, content) = self.read_response(status::PATH_CREATED)?;
        parse_pwd(&content)
    }

    /// This does nothing. This is usually just used to keep the connection open.
    pub fn noop(&mut self) -> Result<()> {
        self.write_str("NOOP\r\n")?;
        self.read_response(status::COMMAND_OK).map(|_| ())
    }

    /// This creates a new directory on the server.
    pub fn mkdir(&mut self, pathname: &str) -> Result<()> {
        self.write_str(format!("MKD {}\r\n", pathname))?;
        self.read_response(status::PATH_CREATED).map(|_| ())
    }

    /// Runs the PASV command.
    fn pasv(&mut self) -> Result<SocketAddr> {
        self.write_str("PASV\r\n")?;
        let Line(_, line) = self.read_response(status::PASSIVE_MODE)?;
        parse_pasv(&line)
    }

    /// Quits the current FTP session.
    pub fn quit(&mut self) -> Result<()> {
        self.write_str("QUIT\r\n")?;
        self.read_response(status::CLOSING).map(|_| ())
    }

    /// Renames the file from_name to to_name
    pub fn rename(&mut self, from_name: &str, to_name: &str) -> Result<()> {
        self.write_str(format!("RNFR {}\r\n", from_name))?;
        self.read_response(status::REQUEST_FILE_PENDING)?;
        self.write_str(format!("RNTO {}\r\n", to_name))?;
        self.read_response(status::REQUESTED_FILE_ACTION_OK).map(|_| ())
    }

    /// Removes the remote pathname from the server.
    pub fn rmdir(&mut self, pathname: &str) -> Result<()> {
        self.write_str(format!("RMD {}\r\n", pathname))?;
        self.read_response(status::REQUESTED_FILE_ACTION_OK).map(|_| ())
    }

    /// Remove the remote file from the server.
    pub fn rm(&mut self, filename: &str) -> Result<()> {
        self.write_str(format!("DELE {}\r\n", filename))?;
        self.read_response(status::REQUESTED_FILE_ACTION_OK).map(|_| ())
    }

    /// Execute a command which returns list of strings in a separate stream
    fn list_command(&mut self, cmd: Cow<'static, str>) -> Result<Vec<String>> {
        let mut text = String::new();
        {
            let mut data_stream = BufReader::new(self.data_command(&cmd)?);
            self.read_response_in(&[status::ABOUT_TO_SEND, status::ALREADY_OPEN])?;
            data_stream.read_to_string(&mut text)?;
        }

        let lines = text
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        self.read_response_in(&[status::CLOSING_DATA_CONNECTION, status::REQUESTED_FILE_ACTION_OK])
            .map(|_| lines)
    }

    /// Execute `LIST` command which returns the detailed file listing in human readable format.
    /// If `pathname` is omited then the list of files in the current directory will be
    /// returned otherwise it will the list of files on `pathname`.
    pub fn list(&mut self, pathname: Option<&str>) -> Result<Vec<String>> {
        let command = pathname.map_or("LIST\r\n".into(), |path| format!("LIST {}\r\n", path).into());
        self.list_command(command)
    }

    /// Execute `NLST` command which returns the list of file names only.
    /// If `pathname` is omited then the list of files in the current directory will be
    /// returned otherwise it will the list of files on `pathname`.
    pub fn nlst(&mut self, pathname: Option<&str>) -> Result<Vec<String>> {
        let command = pathname.map_or("NLST\r\n".into(), |path| format!("NLST {}\r\n", path).into());
        self.list_command(command)
    }

    fn write_str<S: AsRef<str>>(&mut self, command: S) -> Result<()> {
        let command = command.as_ref();
        if command.starts_with("PASS ") {
            trace!("CMD PASS ******");
        } else {
            trace!("CMD {}", command.trim_end());
        }

        let stream = self.reader.get_mut();
        stream.write_all(command.as_bytes())?;
        Ok(())
    }

    pub fn read_response(&mut self, expected_code: u32) -> Result<Line> {
        self.read_response_in(&[expected_code])
    }

    /// Retrieve single line response
    pub fn read_response_in(&mut self, expected_code: &[u32]) -> Result<Line> {
        let mut line = String::new();
        self.read_reply_line(&mut line)?;

        if line.len() < 5 {
            return Err(FtpError::InvalidResponse("error: could not read reply code".to_owned()));
        }

        let code: u32 = line
            .get(0..3)
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| {
                FtpError::InvalidResponse(format!("error: could not parse reply code: {}", line.trim_end()))
            })?;

        // multiple line reply
        // loop while the line does not begin with the code and a space
        let expected = format!("{:03} ", code);
        while line.len() < 5 || !line.starts_with(&expected) {
            line.clear();
            self.read_reply_line(&mut line)?;
        }

        let message = line[4..].trim_end().to_owned();
        if expected_code.iter().any(|ec| code == *ec) {
            Ok(Line(code, message))
        } else {
            if !status::is_positive(code) {
                debug!("server refused command: {} {}", code, message);
            }
            Err(FtpError::UnexpectedReply {
                expected: expected_code.to_vec(),
                code,
                message,
            })
        }
    }

    fn read_reply_line(&mut self, line: &mut String) -> Result<()> {
        let read = self.reader.read_line(line)?;
        if read == 0 {
            return Err(FtpError::ConnectionError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "control connection closed by server",
            )));
        }
        trace!("FTP {}", line.trim_end());
        Ok(())
    }
}

/// Extracts the quoted directory from a `257` reply.
pub(crate) fn parse_pwd(content: &str) -> Result<String> {
    match (content.find('"'), content.rfind('"')) {
        (Some(begin), Some(end)) if begin < end => Ok(content[begin + 1..end].replace("\"\"", "\"")),
        _ => Err(FtpError::InvalidResponse(format!("Invalid PWD Response: {}", content))),
    }
}

/// Extracts the data channel address from a `227` reply.
pub(crate) fn parse_pasv(line: &str) -> Result<SocketAddr> {
    let caps = PORT_RE
        .captures(line)
        .ok_or_else(|| FtpError::InvalidResponse(format!("Invalid PASV response: {}", line)))?;
    let mut fields = [0u8; 6];
    for (idx, field) in fields.iter_mut().enumerate() {
        *field = caps[idx + 1]
            .parse()
            .map_err(|_| FtpError::InvalidResponse(format!("Invalid PASV response: {}", line)))?;
    }
    let port = (u16::from(fields[4]) << 8) + u16::from(fields[5]);
    let addr = format!("{}.{}.{}.{}:{}", fields[0], fields[1], fields[2], fields[3], port);
    Ok(SocketAddr::from_str(&addr)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwd_between_quotes() {
        assert_eq!(parse_pwd("\"/home/ftp\" is current directory").unwrap(), "/home/ftp");
        assert_eq!(parse_pwd("\"/\"").unwrap(), "/");
        assert_eq!(parse_pwd("\"/odd \"\"name\"\"\" is current").unwrap(), "/odd \"name\"");
    }

    #[test]
    fn pwd_without_quotes_is_invalid() {
        match parse_pwd("/home/ftp") {
            Err(FtpError::InvalidResponse(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pasv_address() {
        let addr = parse_pasv("Entering Passive Mode (127,0,0,1,195,80).").unwrap();
        assert_eq!(addr, "127.0.0.1:50000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn pasv_rejects_out_of_range_octets() {
        assert!(parse_pasv("Entering Passive Mode (300,0,0,1,4,1)").is_err());
        assert!(parse_pasv("Entering Passive Mode").is_err());
    }
}
