use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("error reading input: {0}")]
    ReadInput(#[from] std::io::Error),

    #[error("invalid input body: {0}")]
    InvalidBody(String),

    #[error("error creating http request: {0}")]
    InvalidRequest(String),

    #[error("unknown execution format: {0:?} (expected default, http or json)")]
    UnknownFormat(String),

    #[error("hot batch of {runs} calls is too large to encode")]
    BatchTooLarge { runs: usize },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
