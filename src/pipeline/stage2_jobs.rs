use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;

use crate::error::{PipelineError, Result};

pub const PAIRWISE_DIR_ENV: &str = "PAIRWISE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl JobCommand {
    fn command_for(&self, unit: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(unit)
            .current_dir(&self.work_dir)
            .env(PAIRWISE_DIR_ENV, &self.output_dir);
        cmd
    }
}

pub trait JobExecutor: Sync {
    fn execute(&self, unit: &str) -> Result<()>;
}

impl JobExecutor for JobCommand {
    fn execute(&self, unit: &str) -> Result<()> {
        crate::info!("running sample: {unit}");
        let output = self
            .command_for(unit)
            .output()
            .map_err(|source| PipelineError::Spawn {
                unit: unit.to_string(),
                source,
            })?;
        check_output(unit, output)
    }
}

fn check_output(unit: &str, output: Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(PipelineError::ExternalComputation {
        unit: unit.to_string(),
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    pub completed: usize,
}

/// Runs every unit through `executor` on `cores` workers pulling from one queue.
///
/// The first failure stops workers from taking further units; jobs already running are
/// waited for. All failures are logged and the one dispatched earliest is returned.
pub fn run_jobs<E: JobExecutor>(
    units: &[String],
    cores: usize,
    executor: &E,
) -> Result<JobReport> {
    if cores == 0 {
        return Err(PipelineError::InvalidInput(
            "cores must be a positive integer".to_string(),
        ));
    }
    let n_workers = cores.min(units.len()).max(1);
    crate::info!(
        "beginning pairwise differential expression: {} units on {} cores",
        units.len(),
        cores
    );

    let (task_tx, task_rx) = unbounded::<(usize, &str)>();
    for (idx, unit) in units.iter().enumerate() {
        // The receiver outlives this loop, so sending cannot fail.
        let _ = task_tx.send((idx, unit.as_str()));
    }
    drop(task_tx);

    let halted = AtomicBool::new(false);

    let worker_results = thread::scope(|s| {
        let mut handles = Vec::with_capacity(n_workers);
        for _ in 0..n_workers {
            let rx = task_rx.clone();
            let halted = &halted;
            handles.push(s.spawn(move || {
                let mut completed = 0usize;
                let mut failures = Vec::new();
                while let Ok((idx, unit)) = rx.recv() {
                    if halted.load(Ordering::SeqCst) {
                        break;
                    }
                    match executor.execute(unit) {
                        Ok(()) => completed += 1,
                        Err(err) => {
                            halted.store(true, Ordering::SeqCst);
                            failures.push((idx, err));
                        }
                    }
                }
                (completed, failures)
            }));
        }
        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Vec<_>>()
    });

    let mut completed = 0usize;
    let mut failures: Vec<(usize, PipelineError)> = Vec::new();
    for joined in worker_results {
        match joined {
            Ok((n, errs)) => {
                completed += n;
                failures.extend(errs);
            }
            Err(panic) => failures.push((
                usize::MAX,
                PipelineError::WorkerPanic(panic_message(&*panic)),
            )),
        }
    }

    if failures.is_empty() {
        crate::info!("pairwise differential expression finished: {completed} units");
        return Ok(JobReport { completed });
    }

    failures.sort_by_key(|(idx, _)| *idx);
    for (_, err) in &failures {
        crate::error!("{err}");
    }
    crate::error!(
        "{} of {} units failed, {} completed, {} not started",
        failures.len(),
        units.len(),
        completed,
        units.len().saturating_sub(completed + failures.len())
    );
    let (_, first) = failures.remove(0);
    Err(first)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_jobs.rs"]
mod tests;
