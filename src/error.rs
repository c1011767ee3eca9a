use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything the pipeline can fail on. File and process failures are fatal
/// to a run; a frame with no readable symbol is skippable.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed: {detail}")]
    Process {
        program: &'static str,
        detail: String,
    },

    #[error("{program} did not finish within {seconds}s")]
    Timeout {
        program: &'static str,
        seconds: u64,
    },

    #[error("no QR symbol found in frame")]
    SymbolNotFound,

    #[error("cannot render symbol: {reason}")]
    Symbol { reason: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
