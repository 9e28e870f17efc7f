//! Host adapter seam
//!
//! Everything the workflow hooks need from the host environment: prompting,
//! subprocess execution and file access. The CLI supplies [`ShellAdapter`];
//! unit tests substitute a scripted stub so no external tool is ever run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Outcome of one external tool invocation.
///
/// A failed spawn is folded into `stderr` rather than surfaced as an error,
/// so callers judge every invocation the same way.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, if the process ran at all.
    pub exit_code: Option<i32>,
}

impl RunResult {
    /// The tool is considered healthy when it produced no error output.
    pub fn healthy(&self) -> bool {
        self.stderr.trim().is_empty()
    }
}

#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// Run an external program, capturing its output. Extra environment
    /// variables are layered on top of the current environment.
    async fn run(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<RunResult>;

    /// Yes/no confirmation prompt.
    async fn confirm(&self, message: &str) -> Result<bool>;

    /// Free-text prompt.
    async fn input(&self, message: &str) -> Result<String>;

    /// Read a file, `None` when it does not exist.
    async fn read_file(&self, path: &Path) -> Result<Option<String>>;

    /// Write a file, creating parent directories as needed.
    async fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Append to a file, creating it (and parents) if missing.
    async fn append_file(&self, path: &Path, contents: &str) -> Result<()>;
}

/// The real adapter: tokio subprocesses, dialoguer prompts, tokio fs.
pub struct ShellAdapter;

#[async_trait]
impl HostAdapter for ShellAdapter {
    async fn run(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<RunResult> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(err) => {
                return Ok(RunResult {
                    stdout: String::new(),
                    stderr: format!("failed to run `{program}`: {err}"),
                    exit_code: None,
                })
            }
        };

        Ok(RunResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }

    async fn confirm(&self, message: &str) -> Result<bool> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
        })
        .await?
        .context("confirmation prompt failed")
    }

    async fn input(&self, message: &str) -> Result<String> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            dialoguer::Input::<String>::new()
                .with_prompt(message)
                .allow_empty(true)
                .interact_text()
        })
        .await?
        .context("text prompt failed")
    }

    async fn read_file(&self, path: &Path) -> Result<Option<String>> {
        read_file(path).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        write_file(path, contents).await
    }

    async fn append_file(&self, path: &Path, contents: &str) -> Result<()> {
        append_file(path, contents).await
    }
}

pub(crate) async fn read_file(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

pub(crate) async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

pub(crate) async fn append_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .await
        .with_context(|| format!("failed to append to {}", path.display()))
}

#[cfg(test)]
pub(crate) mod stub {
    //! Scripted adapter for unit tests. Subprocess runs pop canned results
    //! and record their command lines; prompts answer from fixed values;
    //! file operations hit the real filesystem (tests use temp dirs).

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub(crate) struct StubAdapter {
        pub runs: Mutex<VecDeque<RunResult>>,
        pub invocations: Mutex<Vec<String>>,
        pub confirm_answer: bool,
        pub inputs: Mutex<VecDeque<String>>,
    }

    impl StubAdapter {
        pub(crate) fn new() -> Self {
            Self {
                runs: Mutex::new(VecDeque::new()),
                invocations: Mutex::new(Vec::new()),
                confirm_answer: true,
                inputs: Mutex::new(VecDeque::new()),
            }
        }

        pub(crate) fn push_run(&self, result: RunResult) {
            self.runs.lock().unwrap().push_back(result);
        }

        pub(crate) fn recorded(&self) -> Vec<String> {
            self.invocations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HostAdapter for StubAdapter {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            _env: &[(&str, &str)],
        ) -> Result<RunResult> {
            self.invocations
                .lock()
                .unwrap()
                .push(format!("{program} {}", args.join(" ")));
            Ok(self
                .runs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }

        async fn confirm(&self, _message: &str) -> Result<bool> {
            Ok(self.confirm_answer)
        }

        async fn input(&self, _message: &str) -> Result<String> {
            Ok(self
                .inputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }

        async fn read_file(&self, path: &Path) -> Result<Option<String>> {
            read_file(path).await
        }

        async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
            write_file(path, contents).await
        }

        async fn append_file(&self, path: &Path, contents: &str) -> Result<()> {
            append_file(path, contents).await
        }
    }
}
