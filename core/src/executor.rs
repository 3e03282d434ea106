use crate::parser::LogSource;
use anyhow::Context;
use os_pipe::PipeReader;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

pub const SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Succeeded,
    Failed,
    ToolNotFound,
    Error,
}

/// Terminal result of one build attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub success: bool,
    pub message: String,
    pub exit_code: Option<i32>,
    pub kind: OutcomeKind,
    pub duration: f64,
}

impl BuildOutcome {
    fn new(kind: OutcomeKind, message: String, exit_code: Option<i32>) -> Self {
        Self {
            success: kind == OutcomeKind::Succeeded,
            message,
            exit_code,
            kind,
            duration: 0.0,
        }
    }

    pub fn succeeded() -> Self {
        Self::new(
            OutcomeKind::Succeeded,
            "Build completed successfully!".to_string(),
            Some(0),
        )
    }

    pub fn exited(code: i32) -> Self {
        Self::new(
            OutcomeKind::Failed,
            format!("Build failed with return code {}", code),
            Some(code),
        )
    }

    pub fn terminated(reason: String) -> Self {
        Self::new(OutcomeKind::Failed, reason, None)
    }

    pub fn tool_not_found(program: &str) -> Self {
        Self::new(
            OutcomeKind::ToolNotFound,
            format!("{} not found or not in PATH.", program),
            None,
        )
    }

    pub fn error(message: String) -> Self {
        Self::new(OutcomeKind::Error, message, None)
    }

    fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Runs `args[0]` with the remaining arguments, handing every line of its
/// merged stdout/stderr to `listener` as it arrives. Lines the tool printed
/// are tagged `LogSource::Tool`; the status lines added here are
/// `LogSource::Kiln`. All failures end up in the returned outcome; nothing
/// is retried.
pub async fn execute_build<F>(args: Vec<String>, mut listener: F) -> BuildOutcome
where
    F: FnMut(LogSource, String) + Send,
{
    let start = Instant::now();
    let program = args.first().cloned().unwrap_or_default();

    let outcome = match spawn(&args) {
        Ok((child, output)) => match stream_output(child, output, &mut listener).await {
            Ok(status) => finish(status, &mut listener),
            Err(err) => unexpected(format!("{:#}", err), &mut listener),
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            for line in [
                format!("[ERROR] Critical: '{}' command not found.", program),
                format!(
                    "[ERROR] Please ensure {} is installed and accessible in your system's PATH.",
                    program
                ),
                install_hint(&program),
            ] {
                listener(LogSource::Kiln, line);
            }
            BuildOutcome::tool_not_found(&program)
        }
        Err(err) => unexpected(err.to_string(), &mut listener),
    };

    outcome.with_duration(start.elapsed().as_secs_f64())
}

/// Human-facing name of the packaging tool, e.g. `PyInstaller` for
/// `/usr/bin/pyinstaller`.
pub fn display_name(program: &str) -> String {
    let name = Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string());

    if name.eq_ignore_ascii_case("pyinstaller") {
        "PyInstaller".to_string()
    } else {
        name
    }
}

fn install_hint(program: &str) -> String {
    if display_name(program) == "PyInstaller" {
        "[ERROR] Installation: pip install pyinstaller".to_string()
    } else {
        "[ERROR] Check the [tool] program setting in kiln.toml.".to_string()
    }
}

/// Starts the child with stdout and stderr sharing one pipe, so the returned
/// reader sees both streams in the order the child wrote them.
fn spawn(args: &[String]) -> io::Result<(Child, PipeReader)> {
    let (program, rest) = args.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "No command to execute")
    })?;

    let (reader, writer) = os_pipe::pipe()?;

    // The write ends are owned by the command and closed when it drops at the
    // end of this statement, leaving the child as the only writer.
    let child = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .spawn()?;

    Ok((child, reader))
}

async fn stream_output<F>(
    mut child: Child,
    output: PipeReader,
    listener: &mut F,
) -> anyhow::Result<ExitStatus>
where
    F: FnMut(LogSource, String) + Send,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let reader_task = tokio::task::spawn_blocking(move || forward_lines(output, tx));

    // Closes once the reader hits EOF and drops its sender.
    while let Some(line) = rx.recv().await {
        listener(LogSource::Tool, line);
    }

    reader_task
        .await
        .context("output reader panicked")?
        .context("Failed to read build output")?;

    child
        .wait()
        .await
        .context("Failed to wait for child process")
}

fn forward_lines<R: Read>(reader: R, tx: mpsc::UnboundedSender<String>) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if tx.send(decode_line(&buf)).is_err() {
            break;
        }
    }

    Ok(())
}

/// Decodes one raw line, replacing invalid UTF-8 and dropping the line ending.
pub fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c| c == '\n' || c == '\r')
        .to_string()
}

fn finish<F: FnMut(LogSource, String)>(status: ExitStatus, listener: &mut F) -> BuildOutcome {
    listener(LogSource::Kiln, String::new());
    listener(LogSource::Kiln, separator());

    if status.success() {
        listener(LogSource::Kiln, "[SUCCESS] Build completed successfully!".to_string());
        return BuildOutcome::succeeded();
    }

    if let Some(code) = status.code() {
        listener(LogSource::Kiln, format!("[ERROR] Build failed with return code {}", code));
        return BuildOutcome::exited(code);
    }

    let reason = termination_reason(&status);
    listener(LogSource::Kiln, format!("[ERROR] {}", reason));
    BuildOutcome::terminated(reason)
}

fn unexpected<F: FnMut(LogSource, String)>(message: String, listener: &mut F) -> BuildOutcome {
    listener(
        LogSource::Kiln,
        format!("[ERROR] An unexpected error occurred: {}", message),
    );
    BuildOutcome::error(message)
}

#[cfg(unix)]
fn termination_reason(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(signal) => {
            let signal_name = match signal {
                1 => "SIGHUP",
                2 => "SIGINT",
                3 => "SIGQUIT",
                4 => "SIGILL",
                6 => "SIGABRT",
                8 => "SIGFPE",
                9 => "SIGKILL",
                11 => "SIGSEGV",
                13 => "SIGPIPE",
                15 => "SIGTERM",
                _ => "unknown signal",
            };
            format!("Build terminated by signal {} ({})", signal, signal_name)
        }
        None => "Build terminated abnormally".to_string(),
    }
}

#[cfg(not(unix))]
fn termination_reason(_status: &ExitStatus) -> String {
    "Build terminated abnormally".to_string()
}
