// argv-echo: prints how its own arguments were parsed.
//
// Configuration comes from the environment:
//   ARGV_ECHO_FORMAT  json (default) or text
//   ARGV_ECHO_PROMPT  question to ask on stdin before printing
//   ARGV_ECHO_LOG     tracing filter directive (default "warn")

use std::process;

use cmdline::{
    CommandLine, CommandLineError, Environment, LocalCommandLine, Options, PositionalArguments,
    ProcessEnvironment, Result,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

#[derive(Debug, PartialEq, Eq)]
struct Config {
    format: Format,
    prompt: Option<String>,
}

impl Config {
    fn from_environment(env: &dyn Environment) -> Result<Self> {
        let format = match env.variable("ARGV_ECHO_FORMAT").as_deref() {
            None | Some("json") => Format::Json,
            Some("text") => Format::Text,
            Some(other) => {
                return Err(CommandLineError::Usage(format!(
                    "ARGV_ECHO_FORMAT must be json or text, not {:?}",
                    other
                )))
            }
        };
        Ok(Config {
            format,
            prompt: env.variable("ARGV_ECHO_PROMPT"),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    options: &'a Options,
    positional_arguments: &'a PositionalArguments,
}

fn render(cmdline: &dyn CommandLine, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&Report {
            options: cmdline.options(),
            positional_arguments: cmdline.positional_arguments(),
        })?),
        Format::Text => {
            let mut lines = Vec::new();
            for (key, value) in cmdline.options().iter() {
                lines.push(format!("option {} = {}", key, value));
            }
            for (index, arg) in cmdline.positional_arguments().iter().enumerate() {
                lines.push(format!("positional {} = {}", index, arg));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn run(cmdline: &mut dyn CommandLine, env: &dyn Environment) -> Result<()> {
    let config = Config::from_environment(env)?;
    debug!(?config, "configuration loaded");

    let answer = match &config.prompt {
        Some(question) => Some(cmdline.ask(question)?),
        None => None,
    };

    let report = render(cmdline, config.format)?;
    cmdline.out(&report)?;
    if let Some(answer) = answer {
        cmdline.out(&format!("answer = {}", answer))?;
    }
    Ok(())
}

fn init_logging(env: &dyn Environment) {
    let filter = env
        .variable("ARGV_ECHO_LOG")
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let env = ProcessEnvironment;
    init_logging(&env);

    let mut cmdline = LocalCommandLine::from_env();
    if let Err(e) = run(&mut cmdline, &env) {
        let _ = cmdline.error(&e);
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdline::{SharedBuffer, StaticEnvironment, Streams};
    use std::io::Cursor;

    fn local(args: &[&str], stdin: &'static str) -> (LocalCommandLine, SharedBuffer) {
        let stdout = SharedBuffer::new();
        let streams = Streams::new(Cursor::new(stdin), stdout.clone(), SharedBuffer::new());
        (LocalCommandLine::new(args.iter().copied(), streams), stdout)
    }

    #[test]
    fn config_defaults_to_json() {
        let config = Config::from_environment(&StaticEnvironment::default()).unwrap();
        assert_eq!(
            config,
            Config {
                format: Format::Json,
                prompt: None,
            }
        );
    }

    #[test]
    fn config_reads_format_and_prompt() {
        let env = StaticEnvironment::new([("ARGV_ECHO_FORMAT", "text"), ("ARGV_ECHO_PROMPT", "Name?")]);
        let config = Config::from_environment(&env).unwrap();
        assert_eq!(config.format, Format::Text);
        assert_eq!(config.prompt.as_deref(), Some("Name?"));
    }

    #[test]
    fn config_rejects_unknown_format() {
        let env = StaticEnvironment::new([("ARGV_ECHO_FORMAT", "yaml")]);
        let err = Config::from_environment(&env).unwrap_err();
        assert!(matches!(err, CommandLineError::Usage(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn json_report() {
        let (mut cmdline, stdout) = local(&["in.txt", "-vq", "--out=x.txt"], "");
        run(&mut cmdline, &StaticEnvironment::default()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&stdout.to_string_lossy()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "options": { "out": "x.txt", "q": true, "v": true },
                "positionalArguments": ["in.txt"],
            })
        );
    }

    #[test]
    fn text_report_with_prompt() {
        let (mut cmdline, stdout) = local(&["--level", "3", "file"], "Ada\n");
        let env = StaticEnvironment::new([("ARGV_ECHO_FORMAT", "text"), ("ARGV_ECHO_PROMPT", "Name?")]);
        run(&mut cmdline, &env).unwrap();

        assert_eq!(
            stdout.to_string_lossy(),
            "Name? option level = 3\npositional 0 = file\nanswer = Ada\n"
        );
    }
}
