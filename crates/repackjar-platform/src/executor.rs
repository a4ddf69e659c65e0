use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::command::Invocation;
use crate::error::{Error, Result};

/// Captured result of a finished invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs one external tool invocation to completion.
///
/// Implementations block the calling thread until the process exits. A
/// non-zero exit status is reported as [`Error::ExitStatus`].
pub trait ProcessExecutor: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Spawns real OS processes.
#[derive(Clone, Debug, Default)]
pub struct SystemExecutor {
    default_timeout: Option<Duration>,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout applied to invocations that do not carry their own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

impl ProcessExecutor for SystemExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let program = invocation.program_name();
        debug!("running {}", invocation);

        // A missing working directory also surfaces as NotFound from spawn.
        if !invocation.current_dir.is_dir() {
            return Err(Error::SpawnFailed {
                program,
                source: std::io::Error::new(
                    ErrorKind::NotFound,
                    format!(
                        "working directory {} does not exist",
                        invocation.current_dir.display()
                    ),
                ),
            });
        }

        let mut child = StdCommand::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::NotFound {
                    program: program.clone(),
                },
                _ => Error::SpawnFailed {
                    program: program.clone(),
                    source: e,
                },
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match invocation.timeout.or(self.default_timeout) {
            Some(timeout) => match child.wait_timeout(timeout) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::TimedOut { program, timeout });
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(Error::WaitFailed { program, source: e });
                }
            },
            None => child.wait().map_err(|e| Error::WaitFailed {
                program: program.clone(),
                source: e,
            })?,
        };

        let output = ProcessOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        for line in output.stderr.lines() {
            warn!("[{}] {}", program, line);
        }

        if !status.success() {
            return Err(Error::ExitStatus {
                program,
                code: status.code(),
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

type Drain = Option<JoinHandle<String>>;

/// Read a pipe to the end on its own thread so a chatty child cannot block on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = pipe.read_to_end(&mut bytes);
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

fn collect(drain: Drain) -> String {
    drain.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Resolve `program` on `PATH`, or accept it as-is when it is already a path.
pub fn locate(program: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(program);
    if candidate.components().count() > 1 {
        return if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(Error::NotFound {
                program: program.to_string(),
            })
        };
    }
    which::which(program).map_err(|_| Error::NotFound {
        program: program.to_string(),
    })
}
