//! Thin, mockable command-line front end.
//!
//! [`CommandLine`] bundles the parsed process arguments with console I/O so a
//! tool can be driven by in-memory streams in tests and by the real process
//! in production. [`Environment`] does the same for environment variables.

pub mod environment;
pub mod error;
pub mod local;
pub mod streams;

pub use argv::{OptionValue, Options, PositionalArguments};
pub use environment::{Environment, ProcessEnvironment, StaticEnvironment};
pub use error::{CommandLineError, Result};
pub use local::LocalCommandLine;
pub use streams::{SharedBuffer, Streams};

/// Means of reading arguments from, and talking to, the command line.
pub trait CommandLine {
    /// All options, short and long, keyed without leading dashes.
    fn options(&self) -> &Options;

    fn positional_arguments(&self) -> &PositionalArguments;

    /// Write `question` to stdout and read one line of answer from stdin.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Write a line to stdout.
    fn out(&mut self, message: &str) -> Result<()>;

    /// Write an error and its sources to stderr.
    fn error(&mut self, error: &dyn std::error::Error) -> Result<()>;
}
