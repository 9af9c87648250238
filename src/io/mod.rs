//! Destinations for the human-readable solver report.
//!
//! Verbose output of a [`DirectSolver`](crate::solver::DirectSolver) goes
//! to a print target chosen through [`ConfigurablePrintTarget`], stdout by
//! default.  Diagnostics sent through the `log` facade are not affected.

use std::fs::File;
use std::io::{self, stdout, Stdout, Write};

/// Where verbose output is written
pub(crate) enum PrintTarget {
    Stdout(Stdout),
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
}

impl PrintTarget {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            PrintTarget::Stdout(out) => out,
            PrintTarget::File(file) => file,
            PrintTarget::Buffer(buffer) => buffer,
            PrintTarget::Stream(stream) => stream,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PrintTarget::Stdout(_) => "Stdout",
            PrintTarget::File(_) => "File",
            PrintTarget::Buffer(_) => "Buffer",
            PrintTarget::Stream(_) => "Stream",
        }
    }
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintTarget::{}", self.name())
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer().flush()
    }
}

/// Objects whose verbose output can be redirected
pub trait ConfigurablePrintTarget {
    /// print to stdout
    fn print_to_stdout(&mut self);
    /// print to a file
    fn print_to_file(&mut self, file: File);
    /// print to any stream implementing `Write`
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// print to an internal buffer, discarding anything buffered before
    fn print_to_buffer(&mut self);
    /// Contents of the internal buffer.  Fails unless printing to a buffer.
    fn get_print_buffer(&mut self) -> io::Result<String>;
    /// the current target, for writing further output to it
    fn print_target(&mut self) -> &mut dyn Write;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(stdout());
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn get_print_buffer(&mut self) -> io::Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            other => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("printing to {}, not to a buffer", other.name()),
            )),
        }
    }

    fn print_target(&mut self) -> &mut dyn Write {
        self
    }
}
