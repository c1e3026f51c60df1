//! Errors and reply lines shared by the control channel and the directory driver

use std::fmt;
use std::io;
use std::net::AddrParseError;

use thiserror::Error;

/// A shorthand for a Result whose error type is always an FtpError.
pub type Result<T> = ::std::result::Result<T, FtpError>;

/// `FtpError` is a library-global error type to describe the different kinds of
/// errors that might occur while talking to an FTP server.
#[derive(Debug, Error)]
pub enum FtpError {
    #[error("FTP ConnectionError: {0}")]
    ConnectionError(#[from] io::Error),
    #[error("FTP SecureError: {0}")]
    SecureError(String),
    #[error("FTP InvalidResponse: {0}")]
    InvalidResponse(String),
    #[error("FTP InvalidAddress: {0}")]
    InvalidAddress(#[from] AddrParseError),
    /// The server answered, but with a code the command does not accept.
    #[error("FTP UnexpectedReply: expected code {expected:?}, got {code} {message}")]
    UnexpectedReply {
        expected: Vec<u32>,
        code: u32,
        message: String,
    },
    #[error("FTP InvalidUrl: {0}")]
    InvalidUrl(String),
}

impl FtpError {
    /// The reply code the server sent, when the failure was a refusal
    /// rather than a transport problem.
    pub fn reply_code(&self) -> Option<u32> {
        match *self {
            FtpError::UnexpectedReply { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// `Line` contains a reply code and the last line of text read from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line(pub u32, pub String);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_code_only_for_refusals() {
        let refused = FtpError::UnexpectedReply {
            expected: vec![250],
            code: 550,
            message: "No such file or directory".into(),
        };
        assert_eq!(refused.reply_code(), Some(550));

        let io_err = FtpError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(io_err.reply_code(), None);
    }

    #[test]
    fn display_names_the_codes() {
        let err = FtpError::UnexpectedReply {
            expected: vec![226, 250],
            code: 450,
            message: "busy".into(),
        };
        assert_eq!(
            err.to_string(),
            "FTP UnexpectedReply: expected code [226, 250], got 450 busy"
        );
        assert_eq!(Line(257, "\"/\" is current\r\n".into()).to_string(), "257 \"/\" is current");
    }
}
