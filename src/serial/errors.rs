#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
    #[error("failed to start reader thread: {0}")]
    Spawn(#[from] std::io::Error),
}
