//! The directory verbs a remote session has to offer.

use super::ftp::FtpStream;
use super::types::Result;

/// An authenticated connection to a directory-oriented remote endpoint.
///
/// Every call is one blocking round-trip. Implementations report the
/// server's refusal as an error and never panic on it.
pub trait Session {
    /// `MKD`: creates a single directory, parents are not created.
    fn make_directory(&mut self, path: &str) -> Result<()>;

    /// `RMD`: removes an empty directory.
    fn remove_directory(&mut self, path: &str) -> Result<()>;

    /// `DELE`: removes a single file.
    fn remove_file(&mut self, path: &str) -> Result<()>;

    /// `RNFR` followed by `RNTO`.
    fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// `PWD`
    fn working_directory(&mut self) -> Result<String>;

    /// `NLST`: entry names under `path`, possibly prefixed with the
    /// directory they were listed from.
    fn list_names(&mut self, path: &str) -> Result<Vec<String>>;

    /// `CWD`
    fn change_directory(&mut self, path: &str) -> Result<()>;
}

impl Session for FtpStream {
    fn make_directory(&mut self, path: &str) -> Result<()> {
        self.mkdir(path)
    }

    fn remove_directory(&mut self, path: &str) -> Result<()> {
        self.rmdir(path)
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        self.rm(path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        FtpStream::rename(self, from, to)
    }

    fn working_directory(&mut self) -> Result<String> {
        self.pwd()
    }

    fn list_names(&mut self, path: &str) -> Result<Vec<String>> {
        self.nlst(Some(path))
    }

    fn change_directory(&mut self, path: &str) -> Result<()> {
        self.cwd(path)
    }
}

impl<'a, S: Session + ?Sized> Session for &'a mut S {
    fn make_directory(&mut self, path: &str) -> Result<()> {
        (**self).make_directory(path)
    }

    fn remove_directory(&mut self, path: &str) -> Result<()> {
        (**self).remove_directory(path)
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        (**self).remove_file(path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        (**self).rename(from, to)
    }

    fn working_directory(&mut self) -> Result<String> {
        (**self).working_directory()
    }

    fn list_names(&mut self, path: &str) -> Result<Vec<String>> {
        (**self).list_names(path)
    }

    fn change_directory(&mut self, path: &str) -> Result<()> {
        (**self).change_directory(path)
    }
}
