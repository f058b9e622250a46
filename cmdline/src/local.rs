use std::io::{BufRead, Write};

use argv::{Options, PositionalArguments};
use tracing::debug;

use crate::error::{CommandLineError, Result};
use crate::streams::Streams;
use crate::CommandLine;

/// Command line of a local process.
#[derive(Debug)]
pub struct LocalCommandLine {
    options: Options,
    positional_arguments: PositionalArguments,
    streams: Streams,
}

impl LocalCommandLine {
    /// Parse `args` (without the program name) and bind `streams`.
    pub fn new<I, S>(args: I, streams: Streams) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (options, positional_arguments) = argv::parse(args).into_parts();
        Self::from_parts(options, positional_arguments, streams)
    }

    /// Arguments and standard streams of the current process.
    pub fn from_env() -> Self {
        let (options, positional_arguments) = argv::parse_env().into_parts();
        Self::from_parts(options, positional_arguments, Streams::std())
    }

    fn from_parts(
        options: Options,
        positional_arguments: PositionalArguments,
        streams: Streams,
    ) -> Self {
        debug!(
            options = options.len(),
            positional = positional_arguments.len(),
            "command line ready"
        );
        LocalCommandLine {
            options,
            positional_arguments,
            streams,
        }
    }
}

impl CommandLine for LocalCommandLine {
    fn options(&self) -> &Options {
        &self.options
    }

    fn positional_arguments(&self) -> &PositionalArguments {
        &self.positional_arguments
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.streams.stdout, "{} ", question)?;
        self.streams.stdout.flush()?;

        let mut answer = String::new();
        if self.streams.stdin.read_line(&mut answer)? == 0 {
            return Err(CommandLineError::EndOfInput);
        }
        answer.truncate(answer.trim_end_matches(|c: char| c == '\n' || c == '\r').len());
        debug!(question, "answer received");
        Ok(answer)
    }

    fn out(&mut self, message: &str) -> Result<()> {
        writeln!(self.streams.stdout, "{}", message)?;
        self.streams.stdout.flush()?;
        Ok(())
    }

    fn error(&mut self, error: &dyn std::error::Error) -> Result<()> {
        writeln!(self.streams.stderr, "error: {}", error)?;
        let mut source = error.source();
        while let Some(cause) = source {
            writeln!(self.streams.stderr, "  caused by: {}", cause)?;
            source = cause.source();
        }
        self.streams.stderr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::SharedBuffer;
    use argv::OptionValue;
    use std::io::{self, Cursor};

    struct Harness {
        cmdline: LocalCommandLine,
        stdout: SharedBuffer,
        stderr: SharedBuffer,
    }

    fn harness(args: &[&str], stdin: &'static str) -> Harness {
        let stdout = SharedBuffer::new();
        let stderr = SharedBuffer::new();
        let streams = Streams::new(Cursor::new(stdin), stdout.clone(), stderr.clone());
        Harness {
            cmdline: LocalCommandLine::new(args.iter().copied(), streams),
            stdout,
            stderr,
        }
    }

    // -- parsed arguments --

    #[test]
    fn no_arguments() {
        let h = harness(&[], "");
        assert!(h.cmdline.options().is_empty());
        assert!(h.cmdline.positional_arguments().is_empty());
    }

    #[test]
    fn positional_arguments() {
        let h = harness(&["hello", "world"], "");
        assert!(h.cmdline.options().is_empty());
        assert_eq!(
            h.cmdline.positional_arguments().as_slice(),
            ["hello", "world"]
        );
    }

    #[test]
    fn all_kinds_of_arguments() {
        let h = harness(
            &["a", "-b", "-c", "d", "-ef", "-gh", "i", "--j", "--k", "l", "m"],
            "",
        );
        let opts = h.cmdline.options();
        assert_eq!(opts.len(), 8);
        assert_eq!(opts.value("c"), Some(&OptionValue::from("d")));
        assert_eq!(opts.value("h"), Some(&OptionValue::from("i")));
        assert_eq!(opts.value("k"), Some(&OptionValue::from("l")));
        for flag in ["b", "e", "f", "g", "j"] {
            assert_eq!(opts.value(flag), Some(&OptionValue::Bool(true)), "{}", flag);
        }
        assert_eq!(h.cmdline.positional_arguments().as_slice(), ["a", "m"]);
    }

    // -- ask --

    #[test]
    fn ask_writes_question_and_returns_answer() {
        let mut h = harness(&[], "world\n");
        let answer = h.cmdline.ask("hello?").unwrap();
        assert_eq!(answer, "world");
        assert_eq!(h.stdout.to_string_lossy(), "hello? ");
    }

    #[test]
    fn ask_strips_crlf() {
        let mut h = harness(&[], "yes\r\nno\n");
        assert_eq!(h.cmdline.ask("continue?").unwrap(), "yes");
        assert_eq!(h.cmdline.ask("again?").unwrap(), "no");
    }

    #[test]
    fn ask_accepts_unterminated_last_line() {
        let mut h = harness(&[], "last");
        assert_eq!(h.cmdline.ask("name?").unwrap(), "last");
    }

    #[test]
    fn ask_at_end_of_input() {
        let mut h = harness(&[], "");
        assert!(matches!(
            h.cmdline.ask("hello?"),
            Err(CommandLineError::EndOfInput)
        ));
        assert_eq!(h.stdout.to_string_lossy(), "hello? ");
    }

    // -- out / error --

    #[test]
    fn out_writes_line_to_stdout() {
        let mut h = harness(&[], "");
        h.cmdline.out("hello world").unwrap();
        assert_eq!(h.stdout.to_string_lossy(), "hello world\n");
        assert_eq!(h.stderr.to_string_lossy(), "");
    }

    #[test]
    fn error_writes_message_to_stderr() {
        let mut h = harness(&[], "");
        h.cmdline
            .error(&CommandLineError::Usage("something bad happened".into()))
            .unwrap();
        assert_eq!(h.stderr.to_string_lossy(), "error: something bad happened\n");
        assert_eq!(h.stdout.to_string_lossy(), "");
    }

    #[test]
    fn error_writes_cause_chain() {
        let mut h = harness(&[], "");
        let err = CommandLineError::from(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        h.cmdline.error(&err).unwrap();
        assert_eq!(
            h.stderr.to_string_lossy(),
            "error: I/O error: no such file\n  caused by: no such file\n"
        );
    }
}
