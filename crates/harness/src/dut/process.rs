//! Process-backed DUT transport.
//!
//! Each command launches the instance executable once, e.g.
//! `impl3.exe cfg --address 0x0`, and reads a single hexadecimal token from
//! its standard output. The exit status alone is never trusted: a command
//! succeeds with a value only if stdout parses as one.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use super::{DutCommand, DutReply, DutTransport};
use crate::common::error::TransportError;
use crate::common::parse_hex;

/// Placeholder substituted with the instance name in program and arguments.
pub const INSTANCE_PLACEHOLDER: &str = "{instance}";

const POLL_INTERVAL: Duration = Duration::from_millis(2);

pub struct ProcessTransport {
    program: String,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessTransport {
    /// `program` is a template such as `{instance}.exe`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments inserted before the command, also templated. Useful when the
    /// DUT is a script run through an interpreter.
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// Directory the executables are launched from.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program_for(&self, instance: &str) -> String {
        self.program.replace(INSTANCE_PLACEHOLDER, instance)
    }

    /// A bare program name is looked up in the working directory first, the
    /// way the bench executables sit next to their data files, then on PATH.
    fn executable_for(&self, instance: &str) -> PathBuf {
        let program = PathBuf::from(self.program_for(instance));
        if let Some(dir) = &self.working_dir {
            if program.components().count() == 1 && dir.join(&program).is_file() {
                return dir.join(program);
            }
        }
        program
    }

    fn command_for(&self, instance: &str, command: &DutCommand) -> Command {
        let mut cmd = Command::new(self.executable_for(instance));
        cmd.args(
            self.leading_args
                .iter()
                .map(|a| a.replace(INSTANCE_PLACEHOLDER, instance)),
        );
        cmd.args(command.args());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(
        &self,
        instance: &str,
        command: &DutCommand,
        timeout: Option<Duration>,
    ) -> Result<Output, TransportError> {
        let program = self.program_for(instance);
        let child = self
            .command_for(instance, command)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: program.clone(),
                source,
            })?;

        match timeout {
            None => child
                .wait_with_output()
                .map_err(|source| TransportError::Io { program, source }),
            Some(limit) => wait_with_deadline(child, &program, limit),
        }
    }
}

/// Polls `child` until it exits or `limit` elapses; a late child is killed.
///
/// Both pipes are drained on their own threads while polling, so a DUT that
/// writes more than the pipe buffer holds still runs to completion.
fn wait_with_deadline(
    mut child: Child,
    program: &str,
    limit: Duration,
) -> Result<Output, TransportError> {
    let io_err = |source| TransportError::Io {
        program: program.to_string(),
        source,
    };
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + limit;

    let status = loop {
        if let Some(status) = child.try_wait().map_err(io_err)? {
            break status;
        }
        if Instant::now() >= deadline {
            // Already exited or unkillable; either way the answer is lost.
            // The readers see EOF once the pipes close and are left detached.
            let _ = child.kill();
            let _ = child.wait();
            return Err(TransportError::Timeout {
                program: program.to_string(),
                after: limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect(stdout).map_err(io_err)?,
        stderr: collect(stderr).map_err(io_err)?,
    })
}

type Drain = thread::JoinHandle<io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(reader: Drain) -> io::Result<Vec<u8>> {
    reader
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))
}

impl DutTransport for ProcessTransport {
    fn execute(
        &mut self,
        instance: &str,
        command: &DutCommand,
        timeout: Option<Duration>,
    ) -> DutReply {
        let output = match self.run(instance, command, timeout) {
            Ok(output) => output,
            Err(err) => return DutReply::Failed(err),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(value) = parse_hex(&stdout) {
            return DutReply::Value(value);
        }

        if !output.status.success() || !stdout.trim().is_empty() {
            debug!(
                "[{}] {} gave no value (status {}): {} {}",
                instance,
                command,
                output.status,
                stdout.trim(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        DutReply::Unavailable
    }
}
