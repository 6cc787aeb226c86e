use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "differential expression run failed for unit {unit} ({status})\n\nstdout:\n{stdout}\nstderr:\n{stderr}"
    )]
    ExternalComputation {
        unit: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("failed to launch differential expression run for unit {unit}: {source}")]
    Spawn {
        unit: String,
        #[source]
        source: std::io::Error,
    },

    #[error("job worker panicked: {0}")]
    WorkerPanic(String),
}

impl PipelineError {
    pub fn failed_unit(&self) -> Option<&str> {
        match self {
            PipelineError::ExternalComputation { unit, .. } | PipelineError::Spawn { unit, .. } => {
                Some(unit)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
