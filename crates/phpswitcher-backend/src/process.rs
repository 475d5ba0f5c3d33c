use async_trait::async_trait;
use log::{debug, error, info, trace};
use std::fmt;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::BackendError;

/// A program invocation, kept as data so runners can be swapped in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ProcessCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Prefix the invocation with an elevation program such as `sudo`.
    ///
    /// `None` or an empty program leaves the command untouched.
    #[must_use]
    pub fn elevated(self, elevation: Option<&str>) -> Self {
        match elevation.map(str::trim).filter(|program| !program.is_empty()) {
            Some(program) => {
                let mut args = vec![self.program.to_string_lossy().into_owned()];
                args.extend(self.args);
                Self {
                    program: PathBuf::from(program),
                    args,
                }
            }
            None => self,
        }
    }

    fn to_tokio(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into [`BackendError::CommandFailed`].
    ///
    /// # Errors
    /// Returns an error when the process did not exit with status zero.
    pub fn into_success(self, command: &ProcessCommand) -> Result<Self, BackendError> {
        if self.success() {
            Ok(self)
        } else {
            Err(BackendError::command_failed(command, self.code, self.stderr))
        }
    }
}

impl From<Output> for ProcessOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion with stdout and stderr captured and hidden.
    async fn capture(&self, command: &ProcessCommand) -> Result<ProcessOutput, BackendError>;

    /// Run to completion, echoing output line by line as it arrives while
    /// also collecting it. Stdin stays attached to the terminal so elevation
    /// prompts reach the user.
    async fn stream(
        &self,
        command: &ProcessCommand,
        limit: Duration,
    ) -> Result<ProcessOutput, BackendError>;
}

/// Runs real processes through tokio.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    capture_timeout: Duration,
}

impl SystemRunner {
    #[must_use]
    pub fn new(capture_timeout: Duration) -> Self {
        Self { capture_timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn capture(&self, command: &ProcessCommand) -> Result<ProcessOutput, BackendError> {
        debug!("Running (captured): {command}");

        let mut cmd = command.to_tokio();
        cmd.stdin(Stdio::null());

        let output = tokio::time::timeout(self.capture_timeout, cmd.output())
            .await
            .map_err(|_| BackendError::timeout(command, self.capture_timeout))??;
        let output = ProcessOutput::from(output);

        debug!("{command} exit status: {:?}", output.code);
        trace!("{command} stdout: {}", output.stdout);
        if !output.stderr.is_empty() {
            trace!("{command} stderr: {}", output.stderr);
        }

        Ok(output)
    }

    async fn stream(
        &self,
        command: &ProcessCommand,
        limit: Duration,
    ) -> Result<ProcessOutput, BackendError> {
        info!("Running: {command}");

        let mut child = command
            .to_tokio()
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (stdout, stderr, status) = tokio::join!(
                relay(stdout, Echo::Stdout),
                relay(stderr, Echo::Stderr),
                child.wait()
            );
            Ok::<_, std::io::Error>(ProcessOutput {
                code: status?.code(),
                stdout: stdout?,
                stderr: stderr?,
            })
        };

        match tokio::time::timeout(limit, run).await {
            Ok(output) => {
                let output = output?;
                debug!("{command} exit status: {:?}", output.code);
                Ok(output)
            }
            Err(_) => {
                error!("{command} timed out after {}s, killing it", limit.as_secs());
                Err(BackendError::timeout(command, limit))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Echo {
    Stdout,
    Stderr,
}

async fn relay<R>(reader: Option<R>, echo: Echo) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };

    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        match echo {
            Echo::Stdout => println!("{line}"),
            Echo::Stderr => eprintln!("{line}"),
        }
        collected.push_str(line);
        collected.push('\n');
    }
    Ok(collected)
}
