//! The implementation under test
//!
//! The harness only needs the RGB888 bytes a hardware or firmware build
//! produces for one raw file; how they are produced is up to the
//! [`HardwarePipeline`] implementation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::image_pipeline::common::error::{IspError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Time limit of every build and run command unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

pub trait HardwarePipeline: Send + Sync {
    fn name(&self) -> &str {
        "hardware"
    }

    /// Processes `raw_path` and returns the produced RGB888 buffer.
    fn run(&self, raw_path: &Path) -> Result<Vec<u8>>;
}

/// Drives an external build and run through the shell.
///
/// `{input}` and `{output}` in the commands are replaced with the raw file
/// and the expected RGB output path. The output defaults to the input path
/// with an `.rgb` extension. Each command is killed after
/// [`DEFAULT_TIMEOUT`] unless another limit is set with
/// [`with_timeout`](Self::with_timeout).
#[derive(Debug, Clone)]
pub struct CommandHardwarePipeline {
    build_command: Option<String>,
    run_command: String,
    output_template: Option<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl CommandHardwarePipeline {
    pub fn new(run_command: impl Into<String>) -> Self {
        Self {
            build_command: None,
            run_command: run_command.into(),
            output_template: None,
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Command run before every vector, e.g. to bake the file names into a firmware image.
    pub fn with_build_command(mut self, command: impl Into<String>) -> Self {
        self.build_command = Some(command.into());
        self
    }

    /// Output path template; may use `{input}` and `{stem}`.
    pub fn with_output(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Upper bound for each command; the child is killed once it elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn output_path(&self, raw_path: &Path) -> PathBuf {
        match &self.output_template {
            Some(template) => {
                let stem = raw_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                PathBuf::from(
                    template
                        .replace("{input}", &raw_path.to_string_lossy())
                        .replace("{stem}", &stem),
                )
            }
            None => raw_path.with_extension("rgb"),
        }
    }

    fn expand(&self, command: &str, raw_path: &Path, output: &Path) -> String {
        command
            .replace("{input}", &raw_path.to_string_lossy())
            .replace("{output}", &output.to_string_lossy())
    }

    fn run_stage(&self, stage: &str, command: &str) -> Result<()> {
        debug!(stage, command, "Spawning");
        let failure = |reason: String| IspError::ExternalToolFailure {
            stage: stage.to_string(),
            reason,
        };

        let mut cmd = shell(command);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("failed to spawn `{command}`: {e}")))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait(&mut child).map_err(|e| failure(e.to_string()))? {
            Some(status) => status,
            None => {
                // The readers are left detached; grandchildren may still hold the pipes.
                return Err(failure(format!("timed out after {:?}: `{command}`", self.timeout)));
            }
        };

        let stdout = join(stdout);
        let stderr = join(stderr);
        if !stdout.is_empty() {
            debug!(stage, "{}", stdout.trim_end());
        }
        if status.success() {
            Ok(())
        } else {
            Err(failure(format!("`{command}` exited with {status}: {}", last_lines(&stderr, 5))))
        }
    }

    /// `Ok(None)` when the timeout elapsed and the child was killed.
    fn wait(&self, child: &mut Child) -> std::io::Result<Option<std::process::ExitStatus>> {
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                warn!("Killing process {} after {:?}", child.id(), timeout);
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl HardwarePipeline for CommandHardwarePipeline {
    fn name(&self) -> &str {
        "command"
    }

    fn run(&self, raw_path: &Path) -> Result<Vec<u8>> {
        let output = self.output_path(raw_path);

        if let Some(build) = &self.build_command {
            self.run_stage("build", &self.expand(build, raw_path, &output))?;
        }
        self.run_stage("run", &self.expand(&self.run_command, raw_path, &output))?;

        let bytes = std::fs::read(&output).map_err(|e| IspError::ExternalToolFailure {
            stage: "collect output".to_string(),
            reason: format!("{}: {e}", output.display()),
        })?;
        info!(output = %output.display(), bytes = bytes.len(), "Hardware output collected");
        Ok(bytes)
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join(" | ")
}
