//! A [`ProcessRunner`] that replays canned results and records every call.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::BackendError;
use crate::process::{ProcessCommand, ProcessOutput, ProcessRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Capture,
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: RunMode,
    pub command: String,
}

/// Responses are keyed by `<program file name> <args...>`, so `sudo apt-get
/// update` and `/opt/homebrew/bin/brew list` match as `sudo apt-get update`
/// and `brew list`. Queued responses for one key are consumed in order and
/// the last one repeats. Unscripted commands fail with exit status 127.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Mutex<HashMap<String, VecDeque<Result<ProcessOutput, BackendError>>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on(self, command: &str, output: ProcessOutput) -> Self {
        self.push(command, Ok(output));
        self
    }

    #[must_use]
    pub fn on_error(self, command: &str, error: BackendError) -> Self {
        self.push(command, Err(error));
        self
    }

    fn push(&self, command: &str, response: Result<ProcessOutput, BackendError>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.command).collect()
    }

    #[must_use]
    pub fn count(&self, command: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.command == command)
            .count()
    }

    fn respond(
        &self,
        mode: RunMode,
        command: &ProcessCommand,
    ) -> Result<ProcessOutput, BackendError> {
        let key = script_key(command);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invocation {
                mode,
                command: key.clone(),
            });

        let mut rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        match rules.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(ProcessOutput::default())),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(ProcessOutput::default())),
            None => Ok(ProcessOutput::failed(127, format!("unscripted command: {key}"))),
        }
    }
}

fn script_key(command: &ProcessCommand) -> String {
    let program = command
        .program
        .file_name()
        .map_or_else(|| command.program.to_string_lossy(), |name| name.to_string_lossy());
    std::iter::once(program.into_owned())
        .chain(command.args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn capture(&self, command: &ProcessCommand) -> Result<ProcessOutput, BackendError> {
        self.respond(RunMode::Capture, command)
    }

    async fn stream(
        &self,
        command: &ProcessCommand,
        _limit: Duration,
    ) -> Result<ProcessOutput, BackendError> {
        self.respond(RunMode::Stream, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_are_consumed_then_repeat() {
        let runner = ScriptedRunner::new()
            .on("brew list --versions php@8.1", ProcessOutput::failed(1, ""))
            .on("brew list --versions php@8.1", ProcessOutput::succeeded("php@8.1 8.1.27"));
        let command = ProcessCommand::new("/opt/homebrew/bin/brew").args(["list", "--versions", "php@8.1"]);

        let first = runner.capture(&command).await.unwrap();
        let second = runner.capture(&command).await.unwrap();
        let third = runner.capture(&command).await.unwrap();

        assert!(!first.success());
        assert!(second.success());
        assert!(third.success());
        assert_eq!(runner.count("brew list --versions php@8.1"), 3);
    }

    #[tokio::test]
    async fn unscripted_commands_fail_and_are_recorded() {
        let runner = ScriptedRunner::new();
        let command = ProcessCommand::new("apt-get").arg("update").elevated(Some("sudo"));

        let output = runner.stream(&command, Duration::from_secs(1)).await.unwrap();

        assert_eq!(output.code, Some(127));
        assert_eq!(
            runner.calls(),
            vec![Invocation {
                mode: RunMode::Stream,
                command: "sudo apt-get update".to_string(),
            }]
        );
    }
}
