use std::{error, fmt, io};

/// An error that occurred while reading or writing a `.size` file.
#[derive(Debug)]
pub struct Error {
    inner: ErrorInner,
}

#[derive(Debug)]
enum ErrorInner {
    Io(io::Error),
    Version { expected: &'static str, found: String },
    Corrupt(String),
    Json(String, serde_json::Error),
    Write(String),
}

/// The kind of error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The version line does not match the only supported format version.
    Version,
    /// The file content does not match its own declared structure.
    Corrupt,
    /// An I/O error occurred on the underlying stream.
    Io(io::ErrorKind),
    /// The size info contains values that cannot be represented in the format.
    Write,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ErrorInner::Io(e) => e.fmt(f),
            ErrorInner::Version { expected, found } => write!(
                f,
                "unsupported format version: expected `{}`, found `{}`",
                expected, found
            ),
            ErrorInner::Corrupt(message) => write!(f, "corrupt size file: {}", message),
            ErrorInner::Json(message, e) => write!(f, "corrupt size file: {}: {}", message, e),
            ErrorInner::Write(message) => f.write_str(message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.inner {
            ErrorInner::Io(e) => Some(e),
            ErrorInner::Json(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::io(error)
    }
}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> ErrorKind {
        match &self.inner {
            ErrorInner::Io(e) => ErrorKind::Io(e.kind()),
            ErrorInner::Version { .. } => ErrorKind::Version,
            ErrorInner::Corrupt(_) | ErrorInner::Json(..) => ErrorKind::Corrupt,
            ErrorInner::Write(_) => ErrorKind::Write,
        }
    }

    pub(crate) fn io(error: io::Error) -> Self {
        Self {
            inner: ErrorInner::Io(error),
        }
    }

    pub(crate) fn version(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            inner: ErrorInner::Version {
                expected,
                found: found.into(),
            },
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self {
            inner: ErrorInner::Corrupt(message.into()),
        }
    }

    pub(crate) fn json(message: impl Into<String>, error: serde_json::Error) -> Self {
        Self {
            inner: ErrorInner::Json(message.into(), error),
        }
    }

    pub(crate) fn write(message: impl Into<String>) -> Self {
        Self {
            inner: ErrorInner::Write(message.into()),
        }
    }
}

/// The `Result` type for this library.
pub type Result<T> = std::result::Result<T, Error>;
