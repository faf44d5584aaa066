//! Where `puts` output goes.
//!
//! - Native: the process's stdout and stderr (default)
//! - Embedding and tests: captured in memory
//! - Silent: discarded
//!
//! # Performance
//! Enum dispatch rather than a trait object: `puts` is called in tight loops.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Output stream named by `puts ?channel?`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub fn parse(name: &str) -> Option<Channel> {
        match name {
            "stdout" => Some(Channel::Stdout),
            "stderr" => Some(Channel::Stderr),
            _ => None,
        }
    }
}

/// Writes to the process's standard streams.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    pub fn write(&self, channel: Channel, text: &str) {
        // A closed pipe is not worth failing the script over.
        let _ = match channel {
            Channel::Stdout => std::io::stdout().lock().write_all(text.as_bytes()),
            Channel::Stderr => std::io::stderr().lock().write_all(text.as_bytes()),
        };
    }

    pub fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Captures both streams in memory.
pub struct BufferPrintHandler {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        BufferPrintHandler {
            stdout: Mutex::new(String::new()),
            stderr: Mutex::new(String::new()),
        }
    }

    pub fn write(&self, channel: Channel, text: &str) {
        match channel {
            Channel::Stdout => self.stdout.lock().push_str(text),
            Channel::Stderr => self.stderr.lock().push_str(text),
        }
    }

    pub fn get_output(&self) -> String {
        self.stdout.lock().clone()
    }

    pub fn get_errors(&self) -> String {
        self.stderr.lock().clone()
    }

    pub fn clear(&self) {
        self.stdout.lock().clear();
        self.stderr.lock().clear();
    }
}

impl Default for BufferPrintHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub enum PrintHandlerImpl {
    Stdout(StdoutPrintHandler),
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    pub fn write(&self, channel: Channel, text: &str) {
        match self {
            Self::Stdout(h) => h.write(channel, text),
            Self::Buffer(h) => h.write(channel, text),
            Self::Silent => {}
        }
    }

    /// Write `text` and a newline.
    pub fn println(&self, channel: Channel, text: &str) {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.write(channel, &line);
    }

    pub fn flush(&self) {
        if let Self::Stdout(h) = self {
            h.flush();
        }
    }

    /// Captured stdout text; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Captured stderr text; empty for handlers that do not capture.
    pub fn get_errors(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_errors(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared between the interpreter and the host that wants to read
/// captured output.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
