use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::{BuildCommand, CommandBuilder};
use crate::executor::{self, display_name, separator, BuildOutcome};
use crate::options::{BuildOptions, ValidationError};
use crate::parser::entry::{LogEntry, LogLevel, LogSource};
use crate::parser::OutputParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum BuildEvent {
    Log(LogEntry),
    Finished(BuildOutcome),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A build is already in progress.")]
    Busy,
}

/// Owns the one build that may be in flight. Events for every build started
/// through this worker arrive on the receiver returned by [`BuildWorker::new`].
pub struct BuildWorker {
    commands: CommandBuilder,
    events: mpsc::UnboundedSender<BuildEvent>,
    state: Arc<Mutex<BuildState>>,
    handle: Option<JoinHandle<BuildOutcome>>,
    last_command: Option<BuildCommand>,
}

impl BuildWorker {
    pub fn new(commands: CommandBuilder) -> (Self, mpsc::UnboundedReceiver<BuildEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let worker = Self {
            commands,
            events,
            state: Arc::new(Mutex::new(BuildState::Idle)),
            handle: None,
            last_command: None,
        };
        (worker, rx)
    }

    pub fn state(&self) -> BuildState {
        *self.state.lock().unwrap()
    }

    pub fn is_running(&self) -> bool {
        self.state() == BuildState::Running
    }

    pub fn last_command(&self) -> Option<&BuildCommand> {
        self.last_command.as_ref()
    }

    pub fn commands(&self) -> &CommandBuilder {
        &self.commands
    }

    /// Validates `options` and launches the build in the background. Nothing
    /// is spawned when validation fails or another build is still running.
    pub fn start(&mut self, options: BuildOptions) -> Result<(), BuildError> {
        if self.is_running() {
            return Err(BuildError::Busy);
        }

        let options = options.normalized();
        options.validate()?;

        let command = self.commands.build(&options);
        self.last_command = Some(command.clone());
        *self.state.lock().unwrap() = BuildState::Running;

        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let program = self.commands.program().to_string();

        self.handle = Some(tokio::spawn(async move {
            let mut parser = OutputParser::new();
            let send = |entry: LogEntry| {
                let _ = events.send(BuildEvent::Log(entry));
            };

            send(parser.stamp(LogEntry::tagged(
                LogLevel::Info,
                format!("Starting {} build process...", display_name(&program)),
            )));
            for entry in command.log {
                send(parser.stamp(entry));
            }
            send(parser.parse_line_from("", LogSource::Kiln));
            send(parser.parse_line_from(&separator(), LogSource::Kiln));
            send(parser.stamp(LogEntry::tagged(
                LogLevel::Process,
                format!("Executing {}...", display_name(&program)),
            )));

            let line_events = events.clone();
            let outcome = executor::execute_build(command.args, move |source, line| {
                let entry = parser.parse_line_from(&line, source);
                let _ = line_events.send(BuildEvent::Log(entry));
            })
            .await;

            *state.lock().unwrap() = if outcome.success {
                BuildState::Succeeded
            } else {
                BuildState::Failed
            };
            let _ = events.send(BuildEvent::Finished(outcome.clone()));

            outcome
        }));

        Ok(())
    }

    /// Waits for the current build, if any, and returns its outcome.
    pub async fn wait(&mut self) -> Option<BuildOutcome> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                *self.state.lock().unwrap() = BuildState::Failed;
                Some(BuildOutcome::error(err.to_string()))
            }
        }
    }
}
