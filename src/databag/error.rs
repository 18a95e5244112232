use thiserror::Error;

#[derive(Error, Debug)]
pub enum BagError {
    /// Input was not a well-formed JSON object.
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// A stored value has no JSON representation.
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid scan source: {0}")]
    InvalidSource(&'static str),

    #[error("Key \"{0}\" does not exist")]
    MissingKey(String),
}

pub type Result<T> = std::result::Result<T, BagError>;
