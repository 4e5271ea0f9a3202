use crate::error::{self, Result};
use log::{debug, info};
use snafu::{OptionExt, ResultExt};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// The captured output of an external command. Lines are kept in the order they were read so
/// that `combined` interleaves `stdout` and `stderr` the way a terminal would show them.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CommandOutput {
    stdout: Vec<String>,
    stderr: Vec<String>,
    combined: Vec<String>,
    exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The exit code, or `None` if the process was terminated by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// `stdout` lines joined with `\n`, without a trailing newline.
    pub fn stdout(&self) -> String {
        self.stdout.join("\n")
    }

    /// `stderr` lines joined with `\n`, without a trailing newline.
    pub fn stderr(&self) -> String {
        self.stderr.join("\n")
    }

    /// All lines from both streams, joined with `\n`, without a trailing newline.
    pub fn combined(&self) -> String {
        self.combined.join("\n")
    }

    /// A message describing a failed command, including everything it printed.
    pub fn failure_message(&self, hint: &str) -> String {
        format!(
            "Error running '{}', exit code {}\nstderr:\n{}\nstdout:\n{}",
            hint,
            self.exit_code.unwrap_or(-1),
            self.stderr(),
            self.stdout()
        )
    }
}

/// Runs `command` to completion, logging each line it prints at `info` level as it arrives.
/// `hint` names the command in logs and errors, e.g. `terraform apply`. A non-zero exit is not an
/// error here; check [`CommandOutput::success`].
pub async fn run_command(command: &mut Command, hint: &str) -> Result<CommandOutput> {
    debug!("Running '{}'", hint);
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context(error::SpawnSnafu { hint })?;

    let stdout = child.stdout.take().context(error::MissingPipeSnafu {
        hint,
        pipe: "stdout",
    })?;
    let stderr = child.stderr.take().context(error::MissingPipeSnafu {
        hint,
        pipe: "stderr",
    })?;
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    let mut output = CommandOutput::default();
    let mut stdout_open = true;
    let mut stderr_open = true;
    while stdout_open || stderr_open {
        tokio::select! {
            line = next_line(&mut stdout, &mut stdout_buf), if stdout_open => {
                match line.context(error::ReadPipeSnafu { hint, pipe: "stdout" })? {
                    Some(line) => {
                        info!("{}", line);
                        output.combined.push(line.clone());
                        output.stdout.push(line);
                    }
                    None => stdout_open = false,
                }
            }
            line = next_line(&mut stderr, &mut stderr_buf), if stderr_open => {
                match line.context(error::ReadPipeSnafu { hint, pipe: "stderr" })? {
                    Some(line) => {
                        info!("{}", line);
                        output.combined.push(line.clone());
                        output.stderr.push(line);
                    }
                    None => stderr_open = false,
                }
            }
        }
    }

    let status = child.wait().await.context(error::WaitSnafu { hint })?;
    output.exit_code = status.code();
    debug!("'{}' exited with {}", hint, status);
    Ok(output)
}

/// Read the next line from `reader` without its line ending, or `None` at end of stream. Bytes
/// that are not valid UTF-8 are replaced rather than treated as an error.
///
/// `buf` is owned by the caller so that a partial line survives when `tokio::select!` drops this
/// future in favour of the other pipe.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(Some(line))
}
