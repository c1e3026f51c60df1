//! Directory management on top of a [`Session`].
//!
//! The protocol has no recursive delete and its name listings do not say
//! which entries are directories, so [`Directory::delete`] probes: it tries
//! the entry as a directory, then as a file, then lists it and recurses.
//! Every refused step is logged and skipped, never returned.

use std::fmt;

use thiserror::Error;

use super::path::{self, SEPARATOR};
use super::session::Session;
use super::types::FtpError;

/// Nesting below which `delete` stops descending.
const MAX_DEPTH: usize = 256;

/// The remote verb behind a failed directory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    MakeDirectory,
    RemoveDirectory,
    RemoveFile,
    Rename,
    WorkingDirectory,
    ListNames,
    ChangeDirectory,
}

impl Verb {
    /// FTP command that carries the verb.
    pub fn command(self) -> &'static str {
        match self {
            Verb::MakeDirectory => "MKD",
            Verb::RemoveDirectory => "RMD",
            Verb::RemoveFile => "DELE",
            Verb::Rename => "RNFR",
            Verb::WorkingDirectory => "PWD",
            Verb::ListNames => "NLST",
            Verb::ChangeDirectory => "CWD",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// A refused or failed remote call, with the path it was issued for.
#[derive(Debug, Error)]
#[error("{verb} {path}: {source}")]
pub struct DirectoryError {
    pub verb: Verb,
    pub path: String,
    #[source]
    pub source: FtpError,
}

impl DirectoryError {
    fn new(verb: Verb, path: &str, source: FtpError) -> DirectoryError {
        DirectoryError {
            verb,
            path: path.to_owned(),
            source,
        }
    }
}

/// Logs a swallowed failure and keeps the success value.
fn report<T>(result: Result<T, DirectoryError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("ignored: {}", err);
            None
        }
    }
}

/// Directory driver bound to a borrowed session.
///
/// The driver keeps no state of its own; the server-side working directory
/// is the only thing its calls move.
///
/// ```no_run
/// use ftp_directory::{Directory, FtpStream};
///
/// let mut session = FtpStream::connect("127.0.0.1:21").unwrap();
/// session.login("anonymous", "anonymous").unwrap();
///
/// let mut dir = Directory::open(&mut session, "/upload");
/// if !dir.exists("cache") {
///     dir.make("cache");
/// }
/// dir.clean(Some("cache"));
/// ```
#[derive(Debug)]
pub struct Directory<'a, S: Session> {
    session: &'a mut S,
}

impl<'a, S: Session> Directory<'a, S> {
    /// Binds a driver to `session` without sending anything.
    pub fn new(session: &'a mut S) -> Directory<'a, S> {
        Directory { session }
    }

    /// Binds a driver and moves into `base_path`. A base path the server
    /// refuses is logged and otherwise ignored; use [`Directory::init`] to
    /// act on that failure instead.
    pub fn open(session: &'a mut S, base_path: &str) -> Directory<'a, S> {
        let mut directory = Directory::new(session);
        if let Err(err) = directory.init(base_path) {
            warn!("staying in the login directory: {}", err);
        }
        directory
    }

    /// Moves the session into the configured base path.
    pub fn init(&mut self, base_path: &str) -> Result<(), DirectoryError> {
        self.try_change(base_path)
    }

    /// Creates the directory `path`. Parents must already exist.
    pub fn make(&mut self, path: &str) -> bool {
        report(self.try_make(path)).is_some()
    }

    /// Like [`Directory::make`]; the error carries `MKD`, the path and the server's reply.
    pub fn try_make(&mut self, path: &str) -> Result<(), DirectoryError> {
        self.session
            .make_directory(path)
            .map_err(|source| DirectoryError::new(Verb::MakeDirectory, path, source))
    }

    /// Removes `path` and everything below it, or only what is below it
    /// when `preserve` is set.
    ///
    /// This is best effort: refusals are logged at debug level and the
    /// teardown carries on with whatever else can be removed.
    pub fn delete(&mut self, path: &str, preserve: bool) {
        self.delete_at(path, preserve, 0)
    }

    fn delete_at(&mut self, path: &str, preserve: bool, depth: usize) {
        if !preserve && (self.remove_directory(path) || self.remove_file(path)) {
            return;
        }

        if depth >= MAX_DEPTH {
            warn!("not descending into {}: more than {} levels deep", path, MAX_DEPTH);
            return;
        }

        if let Some(entries) = self.contents(Some(path)) {
            for entry in entries {
                self.delete_at(&path::join(path, &entry), false, depth + 1);
            }
        }

        if !preserve {
            self.remove_directory(path);
        }
    }

    fn remove_directory(&mut self, path: &str) -> bool {
        let result = self
            .session
            .remove_directory(path)
            .map_err(|source| DirectoryError::new(Verb::RemoveDirectory, path, source));
        report(result).is_some()
    }

    fn remove_file(&mut self, path: &str) -> bool {
        let result = self
            .session
            .remove_file(path)
            .map_err(|source| DirectoryError::new(Verb::RemoveFile, path, source));
        report(result).is_some()
    }

    /// Empties `path`, or the current directory, and keeps the directory.
    /// Nothing is sent when the current directory is needed but unknown.
    pub fn clean(&mut self, path: Option<&str>) {
        match self.resolve(path) {
            Ok(path) => self.delete(&path, true),
            Err(err) => warn!("not cleaning: {}", err),
        }
    }

    /// Renames or moves an entry.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        report(self.try_rename(from, to)).is_some()
    }

    /// Like [`Directory::rename`]; the error carries `RNFR`, the source path and the server's reply.
    pub fn try_rename(&mut self, from: &str, to: &str) -> Result<(), DirectoryError> {
        self.session
            .rename(from, to)
            .map_err(|source| DirectoryError::new(Verb::Rename, from, source))
    }

    /// Working directory, always ending with `/`. A session that cannot
    /// report it yields the bare separator.
    pub fn current(&mut self) -> String {
        report(self.try_current()).unwrap_or_else(|| SEPARATOR.to_string())
    }

    /// Like [`Directory::current`]; the error carries `PWD` and the transport or reply failure.
    pub fn try_current(&mut self) -> Result<String, DirectoryError> {
        self.session
            .working_directory()
            .map(|dir| path::with_trailing_separator(&dir))
            .map_err(|source| DirectoryError::new(Verb::WorkingDirectory, "", source))
    }

    /// Base names of the entries in `path`, or in the current directory.
    ///
    /// `None` means the listing itself failed; an empty directory gives
    /// `Some` of an empty vector.
    pub fn contents(&mut self, path: Option<&str>) -> Option<Vec<String>> {
        report(self.try_contents(path))
    }

    /// Like [`Directory::contents`]; the error carries `PWD` or `NLST` and the path that failed.
    pub fn try_contents(&mut self, path: Option<&str>) -> Result<Vec<String>, DirectoryError> {
        let path = self.resolve(path)?;
        let names = self
            .session
            .list_names(&path)
            .map_err(|source| DirectoryError::new(Verb::ListNames, &path, source))?;

        Ok(names
            .iter()
            .map(|name| path::base_name(name))
            .filter(|name| !name.is_empty() && !path::is_self_or_parent(name))
            .map(String::from)
            .collect())
    }

    /// Changes the session's working directory.
    pub fn change(&mut self, path: &str) -> bool {
        report(self.try_change(path)).is_some()
    }

    /// Like [`Directory::change`]; the error carries `CWD`, the path and the server's reply.
    pub fn try_change(&mut self, path: &str) -> Result<(), DirectoryError> {
        self.session
            .change_directory(path)
            .map_err(|source| DirectoryError::new(Verb::ChangeDirectory, path, source))
    }

    /// Whether `path` is a directory the session can enter.
    ///
    /// Probes by changing into `path` and back, so the working directory
    /// is the same before and after the call. When the session cannot
    /// report its working directory there is nowhere to return to, so
    /// nothing is probed and the answer is `false`.
    pub fn exists(&mut self, path: &str) -> bool {
        let previous = match self.try_current() {
            Ok(previous) => previous,
            Err(err) => {
                warn!("not probing {}: {}", path, err);
                return false;
            }
        };
        let found = self.change(path);
        if found && !self.change(&previous) {
            warn!("could not return to {} after probing {}", previous, path);
        }
        found
    }

    fn resolve(&mut self, path: Option<&str>) -> Result<String, DirectoryError> {
        match path {
            Some(path) if !path.is_empty() => Ok(path.to_owned()),
            _ => self.try_current(),
        }
    }
}
