//! The single output destination of a logger.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{config::LoggerConfig, LoggerError};

/// Where rendered log lines are written.
pub(crate) enum Sink {
    /// Colored lines, written to stdout or to a caller-provided writer.
    Console(Box<dyn Write + Send>),

    /// Uncolored lines, appended to a file through a buffer.
    File(BufWriter<File>),
}

impl Sink {
    pub(crate) fn stdout() -> Self {
        Self::Console(Box::new(io::stdout()))
    }

    /// The sink selected by `config`: its log file if one is set, stdout otherwise.
    pub(crate) fn for_config(config: &LoggerConfig) -> Result<Self, LoggerError> {
        config.file_path().map_or_else(|| Ok(Self::stdout()), Self::open_file)
    }

    /// Opens `path` for appending, creating the file and its parent directories if needed.
    pub(crate) fn open_file(path: &Path) -> Result<Self, LoggerError> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LoggerError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggerError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::File(BufWriter::new(file)))
    }

    /// Whether lines for this sink should carry color escapes.
    pub(crate) fn is_colored(&self) -> bool {
        matches!(self, Self::Console(_))
    }

    /// Writes `line` followed by a newline and flushes.
    ///
    /// The line and its terminator go out in a single `write_all` call.
    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buffer = Vec::with_capacity(line.len() + 1);
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(b'\n');

        let writer: &mut dyn Write = match self {
            Self::Console(writer) => writer.as_mut(),
            Self::File(writer) => writer,
        };
        writer.write_all(&buffer)?;
        writer.flush()
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Console(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console(_) => f.write_str("Console"),
            Self::File(writer) => f.debug_tuple("File").field(writer.get_ref()).finish(),
        }
    }
}
