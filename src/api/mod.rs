//! High-level, ergonomic library API: a `Dcm2Niix` task that renders its
//! command line, runs the converter and resolves the files it produced.
//! Prefer these entrypoints over the low-level `core` modules when embedding
//! the wrapper in a pipeline.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::cmdline::{EXECUTABLE, build_args, render_cmdline};
use crate::core::outputs::{Dcm2NiixOutputs, collect_outputs};
use crate::core::params::Dcm2NiixInputs;
use crate::error::{Error, Result};
use crate::io::process::{CommandRunner, SystemRunner};

/// A configured dcm2niix invocation
#[derive(Debug, Clone)]
pub struct Dcm2Niix {
    pub executable: PathBuf,
    pub inputs: Dcm2NiixInputs,
}

/// Record of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub cmdline: String,
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `None` when the run was not a conversion (`--version`)
    pub outputs: Option<Dcm2NiixOutputs>,
    pub stdout: String,
}

impl Dcm2Niix {
    pub fn new(inputs: Dcm2NiixInputs) -> Self {
        Self {
            executable: PathBuf::from(EXECUTABLE),
            inputs,
        }
    }

    /// Use a specific dcm2niix binary instead of the one on `PATH`.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn args(&self) -> Result<Vec<String>> {
        build_args(&self.inputs)
    }

    /// Command line as it would be typed in a shell.
    pub fn cmdline(&self) -> Result<String> {
        let args = self.args()?;
        Ok(render_cmdline(&self.executable.to_string_lossy(), &args))
    }

    /// Resolve outputs already present in `out_dir` without running anything.
    pub fn outputs(&self) -> Result<Dcm2NiixOutputs> {
        collect_outputs(&self.inputs)
    }

    /// Run with the system process runner.
    pub fn run(&self) -> Result<TaskResult> {
        self.run_with(&SystemRunner)
    }

    /// Validate, invoke through `runner`, then resolve outputs.
    pub fn run_with<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<TaskResult> {
        let args = self.args()?;
        let cmdline = render_cmdline(&self.executable.to_string_lossy(), &args);

        if let Some(out_dir) = self.inputs.out_dir.as_deref() {
            ensure_dir(out_dir)?;
        }

        info!("Starting: {}", cmdline);
        let started_at = Utc::now();
        let output = runner.run(&self.executable, &args)?;
        let finished_at = Utc::now();

        if !output.success() {
            warn!("dcm2niix failed with status {}", output.code);
            return Err(Error::ToolFailed {
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let outputs = if self.inputs.version {
            None
        } else {
            Some(collect_outputs(&self.inputs)?)
        };

        info!(
            "Finished in {} ms",
            (finished_at - started_at).num_milliseconds()
        );

        Ok(TaskResult {
            cmdline,
            exit_code: output.code,
            started_at,
            finished_at,
            outputs,
            stdout: output.stdout,
        })
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        info!("Creating output directory: {:?}", dir);
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
