use crate::{serial::SourceError, settings::SettingsError};

pub type SpitermResult<T> = Result<T, SpitermError>;

#[derive(Debug, thiserror::Error)]
pub enum SpitermError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("no byte source given, pass a serial port or --stdin (available ports: {0})")]
    NoSource(String),
    #[error("buffer capacity must be non-zero")]
    ZeroCapacity,
}
