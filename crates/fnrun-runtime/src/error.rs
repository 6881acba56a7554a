use fnrun_core::EnvelopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to start {bin}: {source}. Is it installed?")]
    SpawnFailed {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("function container exited with {}", exit_description(.code))]
    NonZeroExit { code: Option<i32> },

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}
