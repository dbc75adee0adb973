use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridInnerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("css error: {0}")]
    Css(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
