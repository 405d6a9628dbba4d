use std::path::PathBuf;

use thiserror::Error;

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("{0}")]
    Usage(#[from] clap::error::Error),

    #[error("Cannot create capture workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Cannot launch shell `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read command log {}: {source}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write replay artifact: {0}")]
    ArtifactWrite(String),

    #[error("Replay step {step} failed with exit status {code}")]
    StepFailed { step: usize, code: i32 },

    #[error("Capture not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid metadata document: {0}")]
    Json(#[from] serde_json::Error),
}

impl CaptureError {
    /// Process exit status for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            CaptureError::Usage(err) => err.exit_code(),
            CaptureError::Workspace(_) => 3,
            CaptureError::Spawn { .. } => 4,
            CaptureError::ArtifactWrite(_) => 5,
            CaptureError::StepFailed { code, .. } => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classes_have_distinct_exit_codes() {
        let workspace = CaptureError::Workspace(std::io::Error::other("denied"));
        let spawn = CaptureError::Spawn {
            shell: "/nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let artifact = CaptureError::ArtifactWrite("disk full".into());

        let codes = [
            workspace.exit_code(),
            spawn.exit_code(),
            artifact.exit_code(),
        ];
        assert_eq!(codes, [3, 4, 5]);
    }

    #[test]
    fn failed_step_propagates_its_status() {
        let err = CaptureError::StepFailed { step: 2, code: 42 };
        assert_eq!(err.exit_code(), 42);
        assert_eq!(err.to_string(), "Replay step 2 failed with exit status 42");
    }
}
