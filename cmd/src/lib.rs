use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::process::{Output, Stdio};
use tokio::process::Command as BaseCommand;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn command: {command}")]
    Spawn {
        command: String,
        #[source]
        error: tokio::io::Error,
    },

    /// The command ran but exited non-zero. Displays as the captured output.
    #[error("{output}")]
    Failure {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

/// A program plus arguments, run through `sh` with stderr folded into stdout.
#[derive(Debug, Clone)]
pub struct Command {
    program: OsString,
    args: Vec<OsString>,
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let program = self.program.to_string_lossy();
        let args = self
            .args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        if args.is_empty() {
            write!(f, "{program}",)
        } else {
            write!(f, "{program} {args}",)
        }
    }
}

impl Command {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// The command as a single shell line, each word escaped for `sh`.
    pub fn shell_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|word| shell_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn output(&self) -> Result<Output, CommandError> {
        let line = format!("{} 2>&1", self.shell_line());
        debug!("run: {line}");

        let mut cmd = BaseCommand::new("sh");
        cmd.arg("-c")
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.output().await.map_err(|error| CommandError::Spawn {
            command: self.to_string(),
            error,
        })
    }

    /// Runs to completion. Exit status zero yields the combined output,
    /// anything else yields [`CommandError::Failure`] carrying it.
    pub async fn run(&self) -> Result<String, CommandError> {
        let out = self.output().await?;
        let output = String::from_utf8_lossy(&out.stdout).to_string();
        if out.status.success() {
            Ok(output)
        } else {
            Err(CommandError::Failure {
                command: self.to_string(),
                code: out.status.code(),
                output,
            })
        }
    }
}

fn shell_word(word: &OsStr) -> String {
    let word = word.to_string_lossy();
    shell_escape::unix::escape(Cow::Borrowed(word.as_ref())).into_owned()
}
