use std::path::PathBuf;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum LexflowError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown specialist '{0}' referenced by route")]
    UnknownSpecialist(String),

    #[error("Unknown case type '{0}' used as route key")]
    UnknownCaseType(String),

    #[error("Unknown step '{0}' named in human_review.gates")]
    UnknownGateStep(String),

    #[error("Fallback specialist '{0}' is not defined")]
    UnknownFallback(String),

    #[error("No specialists defined")]
    NoSpecialists,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Completion timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Empty completion from provider")]
    EmptyCompletion,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Review request '{0}' not found")]
    NotFound(String),

    #[error("Review request '{0}' was already resolved")]
    AlreadyResolved(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No route for case type '{0}'")]
    UnknownCaseType(String),

    #[error("Fallback specialist '{0}' is not defined")]
    MissingFallback(String),

    #[error("No checkpoint found for thread '{0}'")]
    NoCheckpoint(String),

    #[error("Failed to acquire semaphore: {0}")]
    Semaphore(#[from] tokio::sync::AcquireError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
