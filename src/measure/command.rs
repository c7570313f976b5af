// src/measure/command.rs

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use super::{parse_response, BoxMap, MeasureError, MeasureRequest, Measurer, Viewport};

/// Measures documents with an external renderer process.
///
/// For every document the program is spawned, sent one JSON request on stdin
/// (`{"html": ..., "viewport": {"width", "height"}}`) and expected to answer on
/// stdout with `{"boxes": {...}}` or `{"error": "..."}`. A wrapper around a
/// headless browser only needs to load the HTML, evaluate
/// [`DOM_QUERY_SCRIPT`](super::DOM_QUERY_SCRIPT) and print the result.
#[derive(Debug, Clone)]
pub struct CommandMeasurer {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandMeasurer {
    pub fn new(program: impl Into<String>) -> Self {
        CommandMeasurer {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Fails the measurement with [`MeasureError::Timeout`] when the renderer
    /// has not answered within `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Measurer for CommandMeasurer {
    fn measure(&mut self, html: &str, viewport: Viewport) -> Result<BoxMap, MeasureError> {
        let mut session = MeasurementSession::start(&self.program, &self.args)?;
        session.exchange(&MeasureRequest { html, viewport }, self.timeout)
    }
}

/// A running renderer process. Dropping the session kills and reaps the child,
/// so a failed or abandoned measurement never leaves the renderer behind.
#[derive(Debug)]
pub struct MeasurementSession {
    child: Child,
}

impl MeasurementSession {
    pub fn start(program: &str, args: &[String]) -> Result<Self, MeasureError> {
        log::debug!("Starting measurement provider: {} {:?}", program, args);
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| MeasureError::Launch(format!("{}: {}", program, e)))?;
        Ok(MeasurementSession { child })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Sends one request and waits for the response.
    ///
    /// Stdin and stdout are serviced on helper threads so a renderer that
    /// stops reading or writing cannot block past the timeout.
    pub fn exchange(
        &mut self,
        request: &MeasureRequest<'_>,
        timeout: Option<Duration>,
    ) -> Result<BoxMap, MeasureError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| MeasureError::Protocol(format!("could not encode request: {}", e)))?;
        let mut stdin = self
            .child
            .stdin
            .take()
            .ok_or_else(|| MeasureError::Protocol("session already used".to_string()))?;
        let mut stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| MeasureError::Protocol("session already used".to_string()))?;

        thread::spawn(move || {
            if let Err(e) = stdin.write_all(&payload) {
                log::debug!("Measurement provider closed stdin early: {}", e);
            }
        });

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            let _ = tx.send(result);
        });

        let received = match timeout {
            Some(limit) => rx.recv_timeout(limit).map_err(|e| match e {
                RecvTimeoutError::Timeout => MeasureError::Timeout(limit),
                RecvTimeoutError::Disconnected => {
                    MeasureError::Protocol("provider output reader vanished".to_string())
                }
            })?,
            None => rx
                .recv()
                .map_err(|_| MeasureError::Protocol("provider output reader vanished".to_string()))?,
        };
        let output = received?;

        if output.trim().is_empty() {
            let status = self.child.wait()?;
            return Err(MeasureError::Render(format!(
                "provider exited with {} without a response",
                status
            )));
        }
        let boxes = parse_response(&output)?;
        log::debug!("Measurement provider reported {} boxes", boxes.len());
        Ok(boxes)
    }
}

impl Drop for MeasurementSession {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                log::warn!("Failed to kill measurement provider {}: {}", self.child.id(), e);
            }
        }
        let _ = self.child.wait();
    }
}
