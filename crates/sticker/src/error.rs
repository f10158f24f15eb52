use thiserror::Error;

#[derive(Debug, Error)]
pub enum TickerError {
    #[error("non-positive interval: the tick interval must be greater than zero")]
    NonPositiveInterval,

    #[error("ticker already stopped")]
    Stopped,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
