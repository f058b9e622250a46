use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};

/// Input, output, and error streams of a command line.
pub struct Streams {
    pub stdin: Box<dyn BufRead + Send>,
    pub stdout: Box<dyn Write + Send>,
    pub stderr: Box<dyn Write + Send>,
}

impl Streams {
    pub fn new<I, O, E>(stdin: I, stdout: O, stderr: E) -> Self
    where
        I: BufRead + Send + 'static,
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Streams {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        }
    }

    /// The process's standard streams.
    pub fn std() -> Self {
        Streams::new(BufReader::new(io::stdin()), io::stdout(), io::stderr())
    }
}

impl Default for Streams {
    fn default() -> Self {
        Streams::std()
    }
}

impl fmt::Debug for Streams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streams").finish_non_exhaustive()
    }
}

/// In-memory writer whose clones share one buffer.
///
/// Hand one clone to [`Streams`] and keep the other to inspect what was
/// written.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn shared_buffer_clones_share_contents() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        write!(writer, "hello {}", 42).unwrap();
        assert_eq!(buffer.to_string_lossy(), "hello 42");
        assert_eq!(buffer.contents(), b"hello 42");
    }

    #[test]
    fn streams_wrap_any_reader_and_writers() {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        let mut streams = Streams::new(Cursor::new("line\n"), out.clone(), err.clone());

        let mut line = String::new();
        streams.stdin.read_line(&mut line).unwrap();
        writeln!(streams.stdout, "to stdout").unwrap();
        writeln!(streams.stderr, "to stderr").unwrap();

        assert_eq!(line, "line\n");
        assert_eq!(out.to_string_lossy(), "to stdout\n");
        assert_eq!(err.to_string_lossy(), "to stderr\n");
    }
}
