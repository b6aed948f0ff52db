//! Launches the external recovery tool and drains its output.
//!
//! The child is spawned directly (no shell) with both output pipes captured.
//! One reader task per pipe and one waiter task feed [`ProcessEvent`]s into a
//! channel. [`ProcessMachine`] folds those events into a [`ProcessPhase`]:
//!
//! ```text
//! Spawned --first event--> Draining --exit seen and both pipes closed--> Exited(code)
//! ```
//!
//! A failed spawn never reaches `Spawned`. The log file is written once the
//! machine reaches `Exited`, whatever the exit code. After a timeout kill the
//! output is drained for at most `KILL_DRAIN_GRACE`, since a process the
//! tool forked may still hold the pipes.

use crate::error::RecoveryError;
use salvor_core::Config;
use salvor_storage::LocalStorage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

const READ_CHUNK_SIZE: usize = 8192;
const EVENT_CHANNEL_CAPACITY: usize = 64;
/// How long to keep draining output once a timed-out tool has been killed
const KILL_DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Notification from one of the tasks watching the child
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Output { stream: OutputStream, chunk: Vec<u8> },
    StreamClosed(OutputStream),
    /// The child exited. `None` when it was terminated by a signal.
    Exited(Option<i32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessPhase {
    Spawned,
    Draining,
    Exited(Option<i32>),
}

/// Result of one completed tool run
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub exit_code: Option<i32>,
    pub log: String,
    pub log_path: PathBuf,
}

impl InvocationOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug)]
pub(crate) struct ProcessMachine {
    phase: ProcessPhase,
    open_streams: usize,
    exit: Option<Option<i32>>,
    log: Vec<u8>,
}

impl ProcessMachine {
    pub(crate) fn new(open_streams: usize) -> Self {
        Self {
            phase: ProcessPhase::Spawned,
            open_streams,
            exit: None,
            log: Vec::new(),
        }
    }

    pub(crate) fn phase(&self) -> ProcessPhase {
        self.phase
    }

    pub(crate) fn is_finished(&self) -> bool {
        matches!(self.phase, ProcessPhase::Exited(_))
    }

    pub(crate) fn apply(&mut self, event: ProcessEvent) {
        if self.is_finished() {
            return;
        }

        match event {
            ProcessEvent::Output { stream, chunk } => {
                let text = String::from_utf8_lossy(&chunk);
                match stream {
                    OutputStream::Stdout => tracing::debug!(output = %text, "photorec stdout"),
                    OutputStream::Stderr => tracing::warn!(output = %text, "photorec stderr"),
                }
                self.log.extend_from_slice(&chunk);
            }
            ProcessEvent::StreamClosed(stream) => {
                tracing::trace!(?stream, "Output stream closed");
                self.open_streams = self.open_streams.saturating_sub(1);
            }
            ProcessEvent::Exited(code) => {
                tracing::info!(exit_code = ?code, "Recovery tool exited");
                self.exit = Some(code);
            }
        }

        if self.phase == ProcessPhase::Spawned {
            self.transition(ProcessPhase::Draining);
        }

        if let Some(code) = self.exit {
            if self.open_streams == 0 {
                self.transition(ProcessPhase::Exited(code));
            }
        }
    }

    fn transition(&mut self, next: ProcessPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "Process phase transition");
        self.phase = next;
    }

    pub(crate) fn exit_code(&self) -> Option<i32> {
        self.exit.flatten()
    }

    pub(crate) fn log_bytes(&self) -> &[u8] {
        &self.log
    }
}

/// Runs the configured recovery binary against one upload
#[derive(Clone, Debug)]
pub struct RecoveryInvoker {
    program: String,
    log_flag: String,
    dest_flag: String,
    timeout: Option<Duration>,
    storage: LocalStorage,
}

impl RecoveryInvoker {
    pub fn new(
        program: impl Into<String>,
        log_flag: impl Into<String>,
        dest_flag: impl Into<String>,
        storage: LocalStorage,
    ) -> Self {
        Self {
            program: program.into(),
            log_flag: log_flag.into(),
            dest_flag: dest_flag.into(),
            timeout: None,
            storage,
        }
    }

    pub fn from_config(config: &Config, storage: LocalStorage) -> Self {
        Self::new(
            config.photorec_path(),
            config.photorec_log_flag(),
            config.photorec_dest_flag(),
            storage,
        )
        .with_timeout(config.recovery_timeout())
    }

    /// Kill the tool if it is still running after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<log-flag> <dest-flag> <scratch-dir> <source-file>`
    pub fn command_args(&self, scratch_dir: &Path, source: &Path) -> Vec<OsString> {
        vec![
            OsString::from(&self.log_flag),
            OsString::from(&self.dest_flag),
            scratch_dir.as_os_str().to_os_string(),
            source.as_os_str().to_os_string(),
        ]
    }

    /// Run the tool to completion and persist its log.
    ///
    /// Returns the outcome for any exit code; only a spawn failure, a timeout
    /// or a failed log write is an error.
    #[tracing::instrument(skip(self), fields(upload_id = %upload_id, program = %self.program))]
    pub async fn run(
        &self,
        upload_id: Uuid,
        scratch_dir: &Path,
        source: &Path,
    ) -> Result<InvocationOutcome, RecoveryError> {
        let args = self.command_args(scratch_dir, source);
        tracing::info!(?args, "Executing recovery tool");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                tracing::error!(error = %source, "Failed to spawn recovery tool");
                RecoveryError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut open_streams = 0;
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputStream::Stdout, tx.clone());
            open_streams += 1;
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputStream::Stderr, tx.clone());
            open_streams += 1;
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                Ok(()) = kill_rx => {
                    if let Err(e) = child.start_kill() {
                        tracing::error!(error = %e, "Failed to kill recovery tool");
                    }
                    child.wait().await
                }
            };
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to wait for recovery tool");
                    None
                }
            };
            let _ = tx.send(ProcessEvent::Exited(code)).await;
        });

        let mut machine = ProcessMachine::new(open_streams);
        let mut deadline = self.timeout.map(|t| tokio::time::Instant::now() + t);
        let mut kill_tx = Some(kill_tx);
        let mut timed_out = false;

        while !machine.is_finished() {
            let event = match deadline {
                Some(at) => match tokio::time::timeout_at(at, rx.recv()).await {
                    Ok(event) => event,
                    Err(_) if !timed_out => {
                        tracing::warn!(
                            timeout_secs = self.timeout.map(|t| t.as_secs()),
                            "Recovery tool exceeded timeout, killing"
                        );
                        if let Some(kill) = kill_tx.take() {
                            let _ = kill.send(());
                        }
                        timed_out = true;
                        // Descendants of the tool can hold the pipes open after the kill.
                        deadline = Some(tokio::time::Instant::now() + KILL_DRAIN_GRACE);
                        continue;
                    }
                    Err(_) => {
                        tracing::warn!(
                            phase = ?machine.phase(),
                            "Output still open after kill, abandoning drain"
                        );
                        break;
                    }
                },
                None => rx.recv().await,
            };

            match event {
                Some(event) => machine.apply(event),
                None => break,
            }
        }

        let log_path = self
            .storage
            .write_log(upload_id, machine.log_bytes())
            .await?;
        let log = String::from_utf8_lossy(machine.log_bytes()).into_owned();

        tracing::info!(
            phase = ?machine.phase(),
            log_path = %log_path.display(),
            log_bytes = machine.log_bytes().len(),
            "Recovery tool finished"
        );

        if timed_out {
            return Err(RecoveryError::TimedOut {
                timeout_secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                log,
            });
        }

        Ok(InvocationOutcome {
            exit_code: machine.exit_code(),
            log,
            log_path,
        })
    }
}

fn spawn_reader<R>(mut reader: R, stream: OutputStream, tx: mpsc::Sender<ProcessEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let event = ProcessEvent::Output {
                        stream,
                        chunk: buf[..n].to_vec(),
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(?stream, error = %e, "Failed to read recovery tool output");
                    break;
                }
            }
        }
        let _ = tx.send(ProcessEvent::StreamClosed(stream)).await;
    });
}
